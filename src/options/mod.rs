// 插件设置的清理与校验

pub mod model;
pub mod sanitizer;
pub mod text;

pub use model::{FieldRejection, RawSettingsPayload, SanitizationReport, SanitizedSettings};
pub use sanitizer::OptionsSanitizer;

pub mod acceptance;
pub mod dispatch;
pub mod distribution;
pub mod layout;
pub mod relativize;

pub use crate::domain::model::{Element, ElementType, Package};
pub use crate::domain::ports::{AssetStore, ConfigProvider, Encoder, JobProcessor, JobQueue};
pub use crate::utils::error::Result;

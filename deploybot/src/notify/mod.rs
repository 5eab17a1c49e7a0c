//! Deployment outcome notifications for a signed chat webhook.
//!
//! - [`events`]: the event a deployment workflow emits when it finishes
//! - [`context`]: entity lookups that turn an event into message inputs
//! - [`message`]: seven-line rich-text post and its wire format
//! - [`signing`]: HMAC-SHA256 signature over the request timestamp
//! - [`dispatcher`]: bounded background delivery that never fails the caller

pub mod context;
pub mod dispatcher;
pub mod events;
pub mod message;
pub mod signing;

pub use context::{DeployDirectory, NotificationContext, resolve};
pub use dispatcher::{DeployNotifier, NotificationPipeline};
pub use events::{DeployMode, DeployStatus, DeploymentEvent};
pub use message::{FeishuMessage, PostBody, render};
pub use signing::sign;

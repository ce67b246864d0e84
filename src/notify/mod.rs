mod dispatcher;
mod telegram;

pub use dispatcher::{DispatchLimits, DispatchReport, NotificationDispatcher};
pub use telegram::{BotTransport, HttpLinkProbe, LinkProbe, TelegramClient, TransportError};

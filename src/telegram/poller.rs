use crate::commands::{self, Command};
use crate::data_models::UserId;
use crate::db::PreferenceStore;
use crate::telegram::{TelegramBot, Update};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const RETRY_PAUSE: Duration = Duration::from_secs(5);

/// Inbound command transport: long-polls the bot for messages and answers
/// `/add`, `/list` and `/remove` against the preference store.
pub struct CommandPoller {
    bot: TelegramBot,
    store: Arc<PreferenceStore>,
    long_poll: Duration,
}

impl CommandPoller {
    pub fn new(bot: TelegramBot, store: Arc<PreferenceStore>, long_poll: Duration) -> Self {
        Self {
            bot,
            store,
            long_poll,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!("command poller started");
        let mut offset = 0;
        loop {
            let updates = tokio::select! {
                _ = shutdown.cancelled() => break,
                updates = self.bot.get_updates(offset, self.long_poll) => updates,
            };
            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle(update).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to poll for commands");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_PAUSE) => {}
                    }
                }
            }
        }
        info!("command poller stopped");
    }

    async fn handle(&self, update: Update) {
        let Some((user, chat_id, command)) = incoming_command(&update) else {
            return;
        };
        debug!(user = %user, command = ?command, "handling command");
        let reply = match commands::execute_blocking(self.store.clone(), user.clone(), command).await
        {
            Ok(reply) => reply,
            Err(err) => {
                error!(user = %user, error = %err, "keyword store task failed");
                return;
            }
        };
        let bot = self.bot.clone();
        tokio::spawn(async move {
            if let Err(err) = bot.send_message(&chat_id, &reply.message).await {
                warn!(user = %user, error = %err, "failed to reply to command");
            }
        });
    }
}

fn incoming_command(update: &Update) -> Option<(UserId, String, Command)> {
    let message = update.message.as_ref()?;
    let command = Command::parse(message.text.as_deref()?)?;
    Some((message.sender(), message.chat.id.to_string(), command))
}

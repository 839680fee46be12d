//! `knowhub chat` - stream an assistant reply to stdout

use std::io::Write;

use serde_json::json;
use tokio::sync::mpsc;

use crate::cli::ChatArgs;
use crate::client::ApiClient;
use crate::config::KnowhubConfig;
use crate::streaming::{ChatStream, ChatUpdate};

/// Stream the reply chunk by chunk. Ctrl-C stops the stream and keeps
/// whatever text already arrived.
pub async fn handle_chat(args: &ChatArgs, config: &KnowhubConfig) -> anyhow::Result<()> {
    let client = ApiClient::from_config(config)?;
    let streamer = ChatStream::new(&client);

    let mut payload = json!({ "message": args.message.join(" ") });
    if let Some(persona) = &args.persona {
        payload["persona"] = json!(persona);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = streamer.start_stream(&args.conversation_id, &payload, tx)?;

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(ChatUpdate::Content(chunk)) => {
                    write!(stdout, "{}", chunk)?;
                    stdout.flush()?;
                }
                Some(ChatUpdate::Complete { message_key, .. }) => {
                    writeln!(stdout)?;
                    tracing::info!(message_key = %message_key, "Reply saved");
                    break;
                }
                Some(ChatUpdate::Error(message)) => {
                    writeln!(stdout)?;
                    anyhow::bail!(message);
                }
                // Sender dropped without a terminal update: the stream was stopped
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                streamer.stop_stream();
                writeln!(stdout, "\n[interrupted]")?;
                break;
            }
        }
    }

    handle.await?;
    Ok(())
}

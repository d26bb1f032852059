//! Elimination notifications.
//!
//! After a report commits, the killer gets mail: either their new target's
//! details or a victory message. Delivery pipes RFC 822 text to a local
//! sendmail binary; in `log` mode the message goes to the log instead.
//! Failures are logged and dropped — the elimination is already committed
//! and nothing here may undo it.

use std::path::{Path, PathBuf};

use ringer_api::EliminationHook;
use ringer_core::{
  engine::EliminationOutcome,
  player::{GameMode, PlayerId},
};
use serde::Deserialize;

use crate::ServerConfig;

/// How notifications leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
  /// Write the rendered message to the log. The dev-mode default.
  #[default]
  Log,
  /// Pipe to the configured sendmail binary with `-ti`.
  Sendmail,
}

struct Message {
  to:      String,
  subject: String,
  body:    String,
}

/// Formats and dispatches killer notifications.
pub struct Notifier {
  delivery:      Delivery,
  mode:          GameMode,
  sendmail_path: PathBuf,
  sender:        String,
  reply_to:      Option<String>,
  /// Mail domain appended to player ids, `id@domain`.
  domain:        String,
}

impl Notifier {
  pub fn from_config(config: &ServerConfig, mode: GameMode) -> Self {
    Self {
      delivery:      config.notify_delivery,
      mode,
      sendmail_path: config.sendmail_path.clone(),
      sender:        config.email_sender.clone(),
      reply_to:      config.email_reply_to.clone(),
      domain:        config.email_domain.clone(),
    }
  }

  fn address(&self, id: &PlayerId) -> String {
    format!("{id}@{}", self.domain)
  }

  fn compose(
    &self,
    killer_id: &PlayerId,
    outcome: &EliminationOutcome,
  ) -> Message {
    match outcome {
      EliminationOutcome::Victory => Message {
        to:      self.address(killer_id),
        subject: "Congratulations!".to_string(),
        body:    "You are the last one standing. The game is yours.\n"
          .to_string(),
      },
      EliminationOutcome::Eliminated {
        next_target_name,
        next_target_secret,
      } => {
        let mut body = format!(
          "Target eliminated. Your new target is {next_target_name}.\n"
        );
        if self.mode.requires_proof() {
          body.push_str(&format!(
            "Their secret word is {next_target_secret:?}.\n"
          ));
        }
        Message {
          to: self.address(killer_id),
          subject: "Target Successfully Eliminated".to_string(),
          body,
        }
      }
    }
  }

  /// Render as RFC 822 text; `sendmail -ti` takes the envelope from the
  /// headers.
  fn render(&self, message: &Message) -> String {
    let mut mail = format!(
      "From: {}\r\nTo: {}\r\nSubject: {}\r\n",
      self.sender, message.to, message.subject,
    );
    if let Some(reply_to) = &self.reply_to {
      mail.push_str(&format!("Reply-To: {reply_to}\r\n"));
    }
    mail.push_str("\r\n");
    mail.push_str(&message.body);
    mail
  }
}

impl EliminationHook for Notifier {
  fn on_elimination(
    &self,
    killer_id: &PlayerId,
    outcome: &EliminationOutcome,
  ) {
    let message = self.compose(killer_id, outcome);
    match self.delivery {
      Delivery::Log => {
        tracing::info!(
          to = %message.to,
          subject = %message.subject,
          "notification: {}",
          message.body.trim_end(),
        );
      }
      Delivery::Sendmail => {
        let mail = self.render(&message);
        let path = self.sendmail_path.clone();
        let to = message.to;
        tokio::spawn(async move {
          if let Err(e) = pipe_to_sendmail(&path, &mail).await {
            tracing::warn!(%to, "failed to send notification: {e}");
          }
        });
      }
    }
  }
}

async fn pipe_to_sendmail(path: &Path, mail: &str) -> std::io::Result<()> {
  use tokio::io::AsyncWriteExt as _;

  let mut child = tokio::process::Command::new(path)
    .arg("-ti")
    .stdin(std::process::Stdio::piped())
    .spawn()?;

  if let Some(mut stdin) = child.stdin.take() {
    stdin.write_all(mail.as_bytes()).await?;
  }

  let status = child.wait().await?;
  if !status.success() {
    return Err(std::io::Error::other(format!("sendmail exited with {status}")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn notifier(mode: GameMode) -> Notifier {
    Notifier {
      delivery:      Delivery::Log,
      mode,
      sendmail_path: PathBuf::from("/usr/sbin/sendmail"),
      sender:        "Gamemaster <game@campus.test>".to_string(),
      reply_to:      Some("gm@campus.test".to_string()),
      domain:        "campus.test".to_string(),
    }
  }

  fn eliminated() -> EliminationOutcome {
    EliminationOutcome::Eliminated {
      next_target_name:   "Carol".to_string(),
      next_target_secret: "meridian".to_string(),
    }
  }

  #[test]
  fn word_mode_mail_includes_the_secret() {
    let n = notifier(GameMode::Word);
    let message = n.compose(&"alice".into(), &eliminated());
    assert_eq!(message.to, "alice@campus.test");
    assert_eq!(message.subject, "Target Successfully Eliminated");
    assert!(message.body.contains("Carol"));
    assert!(message.body.contains("meridian"));
  }

  #[test]
  fn regular_mode_mail_omits_the_secret() {
    let n = notifier(GameMode::Regular);
    let message = n.compose(&"alice".into(), &eliminated());
    assert!(message.body.contains("Carol"));
    assert!(!message.body.contains("meridian"));
  }

  #[test]
  fn victory_mail_goes_to_the_winner() {
    let n = notifier(GameMode::Regular);
    let message = n.compose(&"bob".into(), &EliminationOutcome::Victory);
    assert_eq!(message.to, "bob@campus.test");
    assert_eq!(message.subject, "Congratulations!");
  }

  #[test]
  fn rendered_mail_has_headers_then_body() {
    let n = notifier(GameMode::Word);
    let mail = n.render(&n.compose(&"alice".into(), &eliminated()));
    assert!(mail.starts_with("From: Gamemaster <game@campus.test>\r\n"));
    assert!(mail.contains("Reply-To: gm@campus.test\r\n"));
    assert!(mail.contains("\r\n\r\nTarget eliminated."));
  }
}

//! バックエンドワーカーの起動とポート通知ハンドシェイク
//!
//! 起動したワーカーは標準出力の1行目に待ち受けポートを出力する。
//! その行を受け取るまで接続は確立しない。

use super::TcpChannel;
use crate::error::{EdgarError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

pub struct BackendProcess {
    child: Child,
    port: u16,
}

impl BackendProcess {
    /// ワーカーを起動してポート通知を待つ
    ///
    /// プロセスはこの値のドロップ時に終了させる。
    pub async fn launch(executable: &Path) -> Result<Self> {
        let executable = std::fs::canonicalize(executable)
            .map_err(|_| EdgarError::FileNotFound(executable.display().to_string()))?;

        let mut command = Command::new(&executable);
        if let Some(dir) = executable.parent() {
            command.current_dir(dir);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| EdgarError::Launch(format!("{} ({})", e, executable.display())))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EdgarError::Launch("標準出力を取得できません".into()))?;

        let mut lines = BufReader::new(stdout).lines();
        let announcement = lines
            .next_line()
            .await?
            .ok_or_else(|| EdgarError::Launch("ポートを通知せずに終了しました".into()))?;
        let port = parse_port_announcement(&announcement)?;

        info!(port, executable = %executable.display(), "backend announced port");

        // 以降の出力はログへ（パイプ詰まり防止）
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "backend", "{}", line);
            }
        });

        Ok(Self { child, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    pub async fn connect(&self) -> Result<TcpChannel> {
        TcpChannel::connect(&self.addr()).await
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}

/// ポート通知行を解釈
///
/// `55555` / `tcp://127.0.0.1:55555` / `PORT 55555` を受け付ける。
pub fn parse_port_announcement(line: &str) -> Result<u16> {
    let trimmed = line.trim();
    let tail = trimmed
        .rsplit(|c: char| c == ':' || c.is_whitespace())
        .next()
        .unwrap_or(trimmed);

    tail.parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| EdgarError::Launch(format!("ポート通知を解釈できません ({})", trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_announcement() {
        assert_eq!(parse_port_announcement("55555\n").unwrap(), 55555);
        assert_eq!(parse_port_announcement("tcp://127.0.0.1:4242").unwrap(), 4242);
        assert_eq!(parse_port_announcement("PORT 8080").unwrap(), 8080);
    }

    #[test]
    fn test_parse_port_announcement_rejects_garbage() {
        assert!(matches!(
            parse_port_announcement("starting server..."),
            Err(EdgarError::Launch(_))
        ));
        assert!(parse_port_announcement("0").is_err());
        assert!(parse_port_announcement("70000").is_err());
    }
}

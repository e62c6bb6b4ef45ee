//! 行传输层
//!
//! UCI 以换行分隔的文本通信，通常走标准输入输出。
//! `LineReader` 负责按行读取并限制单行长度，`LineWriter` 负责写出引擎回复。

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::constants::MAX_LINE_LEN;
use crate::error::{ProtocolError, Result};
use crate::message::{EngineMessage, GuiCommand};

/// 行读取器
pub struct LineReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> LineReader<R> {
    /// 创建新的行读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(256),
        }
    }

    /// 读取一行（不含行尾的 `\r\n`）
    ///
    /// 输入结束时返回 `InputClosed`；超长的行会被整行丢弃并返回 `LineTooLarge`。
    pub async fn read_line(&mut self) -> Result<String> {
        self.buffer.clear();

        let limit = (MAX_LINE_LEN + 1) as u64;
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buffer)
            .await?;
        if n == 0 {
            return Err(ProtocolError::InputClosed);
        }

        if self.buffer.len() > MAX_LINE_LEN && self.buffer.last() != Some(&b'\n') {
            let size = self.buffer.len() + self.discard_rest_of_line().await?;
            return Err(ProtocolError::LineTooLarge {
                size,
                max: MAX_LINE_LEN,
            });
        }

        while matches!(self.buffer.last(), Some(b'\n' | b'\r')) {
            self.buffer.pop();
        }

        Ok(String::from_utf8_lossy(&self.buffer).into_owned())
    }

    /// 读取下一条可识别的命令，跳过空行和未知命令
    pub async fn read_command(&mut self) -> Result<GuiCommand> {
        loop {
            let line = self.read_line().await?;
            match GuiCommand::parse(&line)? {
                Some(command) => return Ok(command),
                None if line.trim().is_empty() => {}
                None => tracing::debug!("忽略未知命令: {}", line),
            }
        }
    }

    /// 丢弃当前行剩余部分，返回丢弃的字节数
    async fn discard_rest_of_line(&mut self) -> Result<usize> {
        let mut discarded = 0;
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(discarded);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.reader.consume(i + 1);
                    return Ok(discarded + i + 1);
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                    discarded += len;
                }
            }
        }
    }
}

/// 行写入器
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> LineWriter<W> {
    /// 创建新的行写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写出一条引擎回复并刷新
    pub async fn send(&mut self, msg: &EngineMessage) -> Result<()> {
        let mut text = msg.to_string();
        text.push('\n');
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// 取回内部写入端
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_lines() {
        let input: &[u8] = b"uci\r\nisready\n\nquit";
        let mut reader = LineReader::new(input);

        assert_eq!(reader.read_line().await.unwrap(), "uci");
        assert_eq!(reader.read_line().await.unwrap(), "isready");
        assert_eq!(reader.read_line().await.unwrap(), "");
        assert_eq!(reader.read_line().await.unwrap(), "quit");
        assert!(matches!(
            reader.read_line().await,
            Err(ProtocolError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_read_command_skips_noise() {
        let input: &[u8] = b"\nhello engine\n  isready \n";
        let mut reader = LineReader::new(input);

        assert_eq!(reader.read_command().await.unwrap(), GuiCommand::IsReady);
        assert!(matches!(
            reader.read_command().await,
            Err(ProtocolError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_line_too_large_is_discarded() {
        let mut input = vec![b'x'; MAX_LINE_LEN + 10];
        input.extend_from_slice(b"\nuci\n");
        let mut reader = LineReader::new(input.as_slice());

        match reader.read_line().await {
            Err(ProtocolError::LineTooLarge { size, max }) => {
                assert_eq!(max, MAX_LINE_LEN);
                assert_eq!(size, MAX_LINE_LEN + 11);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(reader.read_line().await.unwrap(), "uci");
    }

    #[tokio::test]
    async fn test_write_messages() {
        let mut writer = LineWriter::new(Vec::new());
        writer.send(&EngineMessage::UciOk).await.unwrap();
        writer
            .send(&EngineMessage::BestMove(Some("e2e4".to_string())))
            .await
            .unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "uciok\nbestmove e2e4\n");
    }
}

//! TCP 위의 JSON-lines 채널 어댑터
//!
//! 한 줄 = 한 `Envelope`. 읽기/쓰기 태스크를 하나씩 띄우고, 수신 핸들러는
//! 읽기 태스크에서 줄 순서대로 실행됩니다. 재연결/백오프는 하지 않습니다.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use super::{Channel, Envelope, Handler, HandlerRouter};
use crate::error::Result;

/// 한 줄 최대 길이: 초과한 줄은 버리고 다음 줄부터 계속 읽음
const MAX_LINE_LENGTH: usize = 1024 * 1024;

pub struct SocketChannel {
    id: uuid::Uuid,
    router: HandlerRouter,
    tx: mpsc::UnboundedSender<Envelope>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SocketChannel {
    /// 백엔드 채널 서버에 연결. 페이지 수명 동안 연결을 유지합니다.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        tracing::info!("Channel connected to {}", addr);
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = uuid::Uuid::new_v4();
        let router = HandlerRouter::new();
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

        let inbound = router.clone();
        let reader = tokio::spawn(async move {
            let mut lines =
                FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
            while let Some(next) = lines.next().await {
                let line = match next {
                    Ok(line) => line,
                    Err(LinesCodecError::MaxLineLengthExceeded) => {
                        tracing::warn!("[channel {}] Oversized frame skipped", id);
                        continue;
                    }
                    Err(LinesCodecError::Io(e)) => {
                        tracing::warn!("[channel {}] Read error: {}", id, e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Envelope>(&line) {
                    Ok(env) => {
                        inbound.deliver(&env.event, &env.data);
                    }
                    Err(e) => tracing::warn!("[channel {}] Undecodable frame: {}", id, e),
                }
            }
            tracing::info!("[channel {}] Inbound stream closed", id);
        });

        let writer = tokio::spawn(async move {
            let mut sink = FramedWrite::new(write_half, LinesCodec::new());
            while let Some(env) = rx.recv().await {
                let line = match serde_json::to_string(&env) {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("[channel {}] Failed to encode '{}': {}", id, env.event, e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(line).await {
                    tracing::warn!("[channel {}] Write error: {}", id, e);
                    break;
                }
            }
            tracing::debug!("[channel {}] Outbound stream closed", id);
        });

        Self { id, router, tx, reader, writer }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed() && !self.reader.is_finished()
    }
}

impl Channel for SocketChannel {
    fn emit(&self, event: &str, payload: Value) {
        if self.tx.send(Envelope::new(event, payload)).is_err() {
            tracing::debug!("[channel {}] Transport gone, '{}' dropped", self.id, event);
        }
    }

    fn on(&self, event: &str, handler: Handler) {
        self.router.register(event, handler);
    }
}

impl Drop for SocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

//! Response output.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::message::Response;

/// Writes responses as newline-terminated JSON, one per line.
///
/// Each line goes out in a single `write_all` under the lock and is flushed
/// before the lock is released, so concurrent writers never tear lines.
pub struct ResponseWriter<W> {
    inner: Mutex<W>,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Serialize and write one response line.
    pub async fn write(&self, response: &Response) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(response)?;
        line.push(b'\n');

        let mut inner = self.inner.lock().await;
        inner.write_all(&line).await?;
        inner.flush().await
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_one_line_per_response() {
        let writer = ResponseWriter::new(Vec::new());
        writer
            .write(&Response::success("a".into(), json!({"n": 1})))
            .await
            .unwrap();
        writer
            .write(&Response::failure("b".into(), "bad\nthing"))
            .await
            .unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(out.ends_with('\n'));
        assert_eq!(lines[0], r#"{"id":"a","result":{"n":1}}"#);
        // Embedded newlines are escaped, never split the line.
        assert_eq!(lines[1], r#"{"id":"b","error":"bad\nthing"}"#);
    }

    #[tokio::test]
    async fn concurrent_writes_do_not_interleave() {
        let writer = std::sync::Arc::new(ResponseWriter::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..32i64 {
            let writer = writer.clone();
            handles.push(tokio::spawn(async move {
                let payload = json!({"blob": "x".repeat(4096)});
                writer.write(&Response::success(i.into(), payload)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let writer = std::sync::Arc::into_inner(writer).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        let mut ids: Vec<i64> = out
            .lines()
            .map(|line| {
                let resp: Response = serde_json::from_str(line).unwrap();
                match resp.id {
                    crate::RequestId::Number(n) => n,
                    other => panic!("unexpected id {other:?}"),
                }
            })
            .collect();
        ids.sort();
        assert_eq!(ids, (0..32).collect::<Vec<_>>());
    }
}

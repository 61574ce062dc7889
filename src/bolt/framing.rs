//! Chunked framing: a message is a sequence of `u16 length` + payload
//! chunks terminated by a zero-length chunk. Operates over any
//! `AsyncRead`/`AsyncWrite` transport; the codec above doesn't know about
//! I/O at all.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Chunks this large enough to need splitting are vanishingly rare for Bolt
/// traffic, but the wire format caps each chunk at `u16::MAX`.
const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

pub async fn write_message<W: AsyncWrite + Unpin>(
    transport: &mut W,
    message: &[u8],
) -> std::io::Result<()> {
    for chunk in message.chunks(MAX_CHUNK_SIZE.max(1)) {
        transport.write_u16(chunk.len() as u16).await?;
        transport.write_all(chunk).await?;
    }
    transport.write_u16(0).await?;
    transport.flush().await
}

pub async fn read_message<R: AsyncRead + Unpin>(transport: &mut R) -> std::io::Result<Vec<u8>> {
    let mut message = Vec::new();
    loop {
        let len = transport.read_u16().await? as usize;
        if len == 0 {
            return Ok(message);
        }
        let start = message.len();
        message.resize(start + len, 0);
        transport.read_exact(&mut message[start..]).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrips_a_message_through_an_in_memory_duplex() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let payload = b"hello bolt".to_vec();
        write_message(&mut client, &payload).await.unwrap();
        let received = read_message(&mut server).await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn splits_oversized_messages_into_multiple_chunks() {
        let (mut client, mut server) = tokio::io::duplex(1 << 18);
        let payload = vec![7u8; MAX_CHUNK_SIZE + 10];
        write_message(&mut client, &payload).await.unwrap();
        let received = read_message(&mut server).await.unwrap();
        assert_eq!(received, payload);
    }
}

//! Bolt handshake and version negotiation: the client proposes up to
//! four versions, the server echoes the one it picked (or all zeroes to
//! reject). Versions >= 5.0 enable the UTC date-time encodings.

use crate::error::BoltError;
use crate::signatures::ProtocolMode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoltVersion {
    pub major: u8,
    pub minor: u8,
}

impl BoltVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        BoltVersion { major, minor }
    }

    fn to_wire(self) -> u32 {
        u32::from_be_bytes([0, 0, self.minor, self.major])
    }

    fn from_wire(word: u32) -> Self {
        let bytes = word.to_be_bytes();
        BoltVersion {
            major: bytes[3],
            minor: bytes[2],
        }
    }

    /// Bolt >= 5.0 enables the UTC date-time PackStream encodings.
    pub fn protocol_mode(self) -> ProtocolMode {
        ProtocolMode {
            utc_patch_enabled: self.major >= 5,
        }
    }
}

/// The driver's preferred version list, newest first, matching the four
/// proposal slots the handshake allows.
pub fn default_proposals() -> [BoltVersion; 4] {
    [
        BoltVersion::new(5, 4),
        BoltVersion::new(5, 0),
        BoltVersion::new(4, 4),
        BoltVersion::new(4, 2),
    ]
}

pub async fn perform_client_handshake<T: AsyncRead + AsyncWrite + Unpin>(
    transport: &mut T,
    proposals: [BoltVersion; 4],
) -> Result<BoltVersion, BoltError> {
    transport.write_all(&MAGIC).await?;
    for version in proposals {
        transport.write_u32(version.to_wire()).await?;
    }
    transport.flush().await?;

    let chosen = transport.read_u32().await?;
    if chosen == 0 {
        return Err(BoltError::HandshakeFailed);
    }
    Ok(BoltVersion::from_wire(chosen))
}

/// Server-side counterpart, used only by the in-process mock transport in
/// tests: read the magic + four proposals, pick the first one this
/// implementation supports.
pub async fn perform_server_handshake<T: AsyncRead + AsyncWrite + Unpin>(
    transport: &mut T,
    supported: &[BoltVersion],
) -> Result<Option<BoltVersion>, BoltError> {
    let mut magic = [0u8; 4];
    transport.read_exact(&mut magic).await?;
    if magic != MAGIC {
        return Err(BoltError::HandshakeFailed);
    }
    let mut proposals = Vec::with_capacity(4);
    for _ in 0..4 {
        proposals.push(BoltVersion::from_wire(transport.read_u32().await?));
    }
    let chosen = proposals.into_iter().find(|p| supported.contains(p));
    transport
        .write_u32(chosen.map(BoltVersion::to_wire).unwrap_or(0))
        .await?;
    transport.flush().await?;
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handshake_negotiates_a_shared_version() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let proposals = default_proposals();
        let server_task = tokio::spawn(async move {
            perform_server_handshake(&mut server, &[BoltVersion::new(5, 0)])
                .await
                .unwrap()
        });
        let chosen = perform_client_handshake(&mut client, proposals)
            .await
            .unwrap();
        assert_eq!(chosen, BoltVersion::new(5, 0));
        assert_eq!(server_task.await.unwrap(), Some(BoltVersion::new(5, 0)));
    }

    #[tokio::test]
    async fn no_common_version_fails_handshake() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let server_task = tokio::spawn(async move {
            perform_server_handshake(&mut server, &[BoltVersion::new(3, 0)]).await
        });
        let result = perform_client_handshake(&mut client, default_proposals()).await;
        assert!(matches!(result, Err(BoltError::HandshakeFailed)));
        server_task.await.unwrap().unwrap();
    }

    #[test]
    fn version_5_enables_utc_mode() {
        assert!(BoltVersion::new(5, 0).protocol_mode().utc_patch_enabled);
        assert!(!BoltVersion::new(4, 4).protocol_mode().utc_patch_enabled);
    }
}

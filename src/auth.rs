use crate::error::{CredentialError, HandshakeError};
use crate::protocol::{AuthMethod, AuthStatus, USERPASS_VERSION, Version};
use std::collections::HashSet;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Credentials holds the accepted `username:password` tokens.
///
/// Built once before the listener starts and shared read-only afterwards.
/// A token is only ever used as a lookup key: the username and password
/// are joined with a literal colon and never split again, so `ab:c` +
/// `d` and `ab` + `c:d` are the same token.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    tokens: HashSet<String>,
}

/// Credentials implementation block
impl Credentials {
    /// new returns an empty credential set -> no authentication
    pub fn new() -> Self {
        Self::default()
    }

    /// from_tokens builds a credential set from `username:password` tokens
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut credentials = Self::new();
        for token in tokens {
            credentials.insert(token)?;
        }
        Ok(credentials)
    }

    /// insert adds one token, rejecting duplicates and tokens with no colon
    pub fn insert(&mut self, token: impl Into<String>) -> Result<(), CredentialError> {
        let token = token.into();
        if !token.contains(':') {
            return Err(CredentialError::Malformed(token));
        }
        if self.tokens.contains(&token) {
            return Err(CredentialError::Duplicate(token));
        }
        self.tokens.insert(token);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// contains looks up the token formed from raw wire bytes
    pub fn contains(&self, username: &[u8], password: &[u8]) -> bool {
        let token = token(username, password);
        std::str::from_utf8(&token).is_ok_and(|token| self.tokens.contains(token))
    }

    /// required_method is the only method this server will accept:
    /// username/password when any credential is configured, otherwise none
    pub fn required_method(&self) -> AuthMethod {
        if self.is_empty() {
            AuthMethod::NoAuth
        } else {
            AuthMethod::UserPass
        }
    }
}

/// token joins username and password exactly as received, with a colon
pub fn token(username: &[u8], password: &[u8]) -> Vec<u8> {
    let mut token = Vec::with_capacity(username.len() + password.len() + 1);
    token.extend_from_slice(username);
    token.push(b':');
    token.extend_from_slice(password);
    token
}

/// negotiate_auth handles authentication negotiation between the SOCKS server and client
/// and returns the selected method once the client is cleared to send its request
pub async fn negotiate_auth<S>(
    stream: &mut S,
    credentials: &Credentials,
) -> Result<AuthMethod, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // ClientHello format
    // +----+----------+----------+
    // |VER | NMETHODS | METHODS  |
    // +----+----------+----------+
    // | 1  |    1     | 1 to 255 |
    // +----+----------+----------+

    // Instantiate handshake buffer & read
    let mut buf = [0u8; 2];
    stream.read_exact(&mut buf).await?;

    // Parse version and client methods from handshake
    let version = buf[0];
    let n_methods = buf[1];

    // Not a SOCKS5 client -> nothing is owed on the wire
    if version != Version::SOCKS5 as u8 {
        return Err(HandshakeError::UnsupportedVersion(version));
    }

    let mut methods = vec![0u8; n_methods as usize];
    stream.read_exact(&mut methods).await?;

    // ServerChoice method selection reply format
    // +----+--------+
    // |VER | METHOD |
    // +----+--------+
    // | 1  |   1    |
    // +----+--------+

    let method = credentials.required_method();
    if !methods.contains(&(method as u8)) {
        warn!("client offered {:?}, required {:?}", methods, method);
        stream
            .write_all(&[Version::SOCKS5 as u8, AuthMethod::NoAcceptable as u8])
            .await?;
        return Err(HandshakeError::NoAcceptableMethod);
    }

    stream.write_all(&[Version::SOCKS5 as u8, method as u8]).await?;

    if method == AuthMethod::UserPass {
        authenticate_userpass(stream, credentials).await?;
    }

    Ok(method)
}

/// authenticate_userpass handles username/password authentication according to RFC 1929
async fn authenticate_userpass<S>(
    stream: &mut S,
    credentials: &Credentials,
) -> Result<(), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Client Username/Password Request
    // +----+------+----------+------+----------+
    // |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    // +----+------+----------+------+----------+
    // | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
    // +----+------+----------+------+----------+

    let ver = stream.read_u8().await?;
    if ver != USERPASS_VERSION {
        send_auth_status(stream, AuthStatus::Failure).await?;
        return Err(HandshakeError::UnsupportedAuthVersion(ver));
    }

    let username_len = stream.read_u8().await?;
    let mut username = vec![0u8; username_len as usize];
    stream.read_exact(&mut username).await?;

    let password_len = stream.read_u8().await?;
    let mut password = vec![0u8; password_len as usize];
    stream.read_exact(&mut password).await?;

    let status = if credentials.contains(&username, &password) {
        AuthStatus::Success
    } else {
        AuthStatus::Failure
    };

    send_auth_status(stream, status).await?;

    match status {
        AuthStatus::Success => {
            debug!("authenticated user {}", String::from_utf8_lossy(&username));
            Ok(())
        }
        AuthStatus::Failure => Err(HandshakeError::AuthenticationFailed),
    }
}

/// send_auth_status writes the username/password reply
// +----+--------+
// |VER | STATUS |
// +----+--------+
// | 1  |   1    |
// +----+--------+
async fn send_auth_status<W>(stream: &mut W, status: AuthStatus) -> Result<(), HandshakeError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&[USERPASS_VERSION, status as u8]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn alice() -> Credentials {
        Credentials::from_tokens(["alice:secret"]).unwrap()
    }

    fn auth_request(username: &str, password: &str) -> Vec<u8> {
        let mut req = vec![USERPASS_VERSION, username.len() as u8];
        req.extend_from_slice(username.as_bytes());
        req.push(password.len() as u8);
        req.extend_from_slice(password.as_bytes());
        req
    }

    #[test]
    fn test_required_method() {
        assert_eq!(Credentials::new().required_method(), AuthMethod::NoAuth);
        assert_eq!(alice().required_method(), AuthMethod::UserPass);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_malformed() {
        let mut credentials = alice();
        assert_eq!(
            credentials.insert("alice:secret"),
            Err(CredentialError::Duplicate("alice:secret".into()))
        );
        assert_eq!(
            credentials.insert("nocolon"),
            Err(CredentialError::Malformed("nocolon".into()))
        );
        assert_eq!(credentials.len(), 1);
    }

    #[test]
    fn test_token_colon_ambiguity_is_preserved() {
        let credentials = Credentials::from_tokens(["ab:c:d"]).unwrap();
        assert!(credentials.contains(b"ab:c", b"d"));
        assert!(credentials.contains(b"ab", b"c:d"));
        assert!(!credentials.contains(b"ab", b"c"));
    }

    #[test]
    fn test_non_utf8_token_never_matches() {
        let credentials = alice();
        assert!(!credentials.contains(&[0xff, 0xfe], b"secret"));
    }

    #[tokio::test]
    async fn test_bad_version_writes_nothing() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x04, 0x01, 0x00]).await.unwrap();

        let err = negotiate_auth(&mut server, &Credentials::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HandshakeError::UnsupportedVersion(4)));

        drop(server);
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_selects_no_auth_without_credentials() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x05, 0x02, 0x00, 0x02]).await.unwrap();

        let method = negotiate_auth(&mut server, &Credentials::new()).await.unwrap();
        assert_eq!(method, AuthMethod::NoAuth);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x00]);
    }

    #[tokio::test]
    async fn test_no_acceptable_method() {
        let (mut client, mut server) = duplex(64);
        // Offers only no-auth while credentials are configured
        client.write_all(&[0x05, 0x01, 0x00]).await.unwrap();

        let err = negotiate_auth(&mut server, &alice()).await.unwrap_err();
        assert!(matches!(err, HandshakeError::NoAcceptableMethod));

        drop(server);
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0xFF]);
    }

    #[tokio::test]
    async fn test_userpass_success() {
        let (mut client, mut server) = duplex(128);
        client.write_all(&[0x05, 0x02, 0x00, 0x02]).await.unwrap();
        client
            .write_all(&auth_request("alice", "secret"))
            .await
            .unwrap();

        let method = negotiate_auth(&mut server, &alice()).await.unwrap();
        assert_eq!(method, AuthMethod::UserPass);

        let mut reply = [0u8; 4];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x02, 0x01, 0x00]);
    }

    #[tokio::test]
    async fn test_userpass_failure() {
        let (mut client, mut server) = duplex(128);
        client.write_all(&[0x05, 0x01, 0x02]).await.unwrap();
        client
            .write_all(&auth_request("alice", "wrong"))
            .await
            .unwrap();

        let err = negotiate_auth(&mut server, &alice()).await.unwrap_err();
        assert!(matches!(err, HandshakeError::AuthenticationFailed));

        drop(server);
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x02, 0x01, 0x01]);
    }

    #[tokio::test]
    async fn test_bad_auth_version_is_rejected() {
        let (mut client, mut server) = duplex(128);
        client.write_all(&[0x05, 0x01, 0x02, 0x02]).await.unwrap();

        let err = negotiate_auth(&mut server, &alice()).await.unwrap_err();
        assert!(matches!(err, HandshakeError::UnsupportedAuthVersion(2)));

        drop(server);
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x02, 0x01, 0x01]);
    }

    #[tokio::test]
    async fn test_truncated_greeting() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x05, 0x03, 0x00]).await.unwrap();
        drop(client);

        let err = negotiate_auth(&mut server, &Credentials::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HandshakeError::Truncated(_)));
    }
}

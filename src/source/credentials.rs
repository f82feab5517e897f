//! Service Account Credentials
//!
//! 認証情報ファイルの読み込みと、サービスアカウントキーによる
//! RS256署名付きJWTアサーションの生成を提供するモジュール。

use std::path::Path;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReportError;

/// スプレッドシートの読み取り専用スコープ
const SPREADSHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// データソースに渡す認証情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// サービスアカウントキー（JSON文字列のまま保持し、解析は認証時に行う）
    ServiceAccountKey(String),

    /// 認証情報なし（ローカルワークブックなど）
    Anonymous,
}

impl Credentials {
    /// 認証情報ファイルを読み込む
    ///
    /// ファイルの存在はネットワークアクセスより前にここで確認されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Credentials::ServiceAccountKey)` - 読み込みに成功した場合
    /// * `Err(ReportError::CredentialsNotFound)` - ファイルが存在しない場合
    /// * `Err(ReportError::Config)` - ファイルが読み込めない場合
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        if !path.is_file() {
            return Err(ReportError::CredentialsNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loaded credentials file");
        Ok(Credentials::ServiceAccountKey(contents))
    }
}

/// サービスアカウントキー（JSON）の必要なフィールド
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

impl ServiceAccountKey {
    /// JSON文字列からキーを解析
    ///
    /// 不正な形式の場合は`ReportError::Auth`を返します。
    pub fn try_from_str(input: &str) -> Result<Self, ReportError> {
        let key: Self = serde_json::from_str(input).map_err(|e| {
            ReportError::Auth(format!("Malformed service account key: {}", e))
        })?;

        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(ReportError::Auth(
                "Service account key is missing client_email or private_key".to_string(),
            ));
        }

        Ok(key)
    }

    /// トークン交換用の署名付きJWTを生成
    ///
    /// ヘッダーとクレームをbase64url（パディングなし）でエンコードし、
    /// PKCS#1 v1.5 SHA-256（RS256）で署名します。有効期限は発行から1時間です。
    pub fn signed_jwt(&self, now: DateTime<Utc>) -> Result<String, ReportError> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_READONLY_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let header_json = serde_json::to_string(&header)
            .map_err(|e| ReportError::Auth(format!("Failed to encode jwt header: {}", e)))?;
        let claims_json = serde_json::to_string(&claims)
            .map_err(|e| ReportError::Auth(format!("Failed to encode jwt claims: {}", e)))?;

        let signing_input = format!(
            "{}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(header_json),
            BASE64_URL_SAFE_NO_PAD.encode(claims_json)
        );

        let key_pair = self.key_pair()?;
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| ReportError::Auth("Failed to sign jwt".to_string()))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    /// PEM形式の秘密鍵からRSA鍵ペアを生成（内部ヘルパー）
    fn key_pair(&self) -> Result<RsaKeyPair, ReportError> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let item = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| ReportError::Auth(format!("Invalid PEM private key: {}", e)))?;

        match item {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|e| {
                    ReportError::Auth(format!("Rejected pkcs8 private key: {}", e))
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|e| {
                    ReportError::Auth(format!("Rejected pkcs1 private key: {}", e))
                })
            }
            _ => Err(ReportError::Auth(
                "No RSA private key found in service account key".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    const TEST_KEY_PEM: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");

    fn key_json(private_key: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "report-project",
            "private_key_id": "abc123",
            "private_key": private_key,
            "client_email": "reporter@report-project.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token",
        })
        .to_string()
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_from_file_missing() {
        let result = Credentials::from_file(Path::new("definitely/missing/credentials.json"));
        match result {
            Err(ReportError::CredentialsNotFound(path)) => {
                assert!(path.ends_with("credentials.json"));
            }
            other => panic!("Expected CredentialsNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"client_email\": \"x\"}}").unwrap();

        let credentials = Credentials::from_file(file.path()).unwrap();
        assert_eq!(
            credentials,
            Credentials::ServiceAccountKey("{\"client_email\": \"x\"}".to_string())
        );
    }

    #[test]
    fn test_from_file_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Credentials::from_file(dir.path());
        assert!(matches!(result, Err(ReportError::CredentialsNotFound(_))));
    }

    #[test]
    fn test_try_from_str_malformed() {
        let result = ServiceAccountKey::try_from_str("not json");
        match result {
            Err(ReportError::Auth(msg)) => assert!(msg.contains("Malformed")),
            other => panic!("Expected Auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_try_from_str_default_token_uri() {
        let json = r#"{"client_email": "a@b.c", "private_key": "pem"}"#;
        let key = ServiceAccountKey::try_from_str(json).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_try_from_str_empty_private_key() {
        let json = r#"{"client_email": "a@b.c", "private_key": ""}"#;
        assert!(matches!(
            ServiceAccountKey::try_from_str(json),
            Err(ReportError::Auth(_))
        ));
    }

    #[test]
    fn test_signed_jwt_structure() {
        let key = ServiceAccountKey::try_from_str(&key_json(TEST_KEY_PEM)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();

        let jwt = key.signed_jwt(now).unwrap();
        let segments: Vec<&str> = jwt.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = decode_segment(segments[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["kid"], "abc123");

        let claims = decode_segment(segments[1]);
        assert_eq!(
            claims["iss"],
            "reporter@report-project.iam.gserviceaccount.com"
        );
        assert_eq!(claims["scope"], SPREADSHEETS_READONLY_SCOPE);
        assert_eq!(claims["aud"], "https://oauth2.googleapis.com/token");
        assert_eq!(claims["iat"], now.timestamp());
        assert_eq!(claims["exp"], now.timestamp() + 3600);

        // 2048bit鍵の署名は256バイト
        let signature = BASE64_URL_SAFE_NO_PAD.decode(segments[2]).unwrap();
        assert_eq!(signature.len(), 256);
    }

    #[test]
    fn test_signed_jwt_invalid_pem() {
        let key = ServiceAccountKey::try_from_str(&key_json("not a pem")).unwrap();
        let result = key.signed_jwt(Utc::now());
        assert!(matches!(result, Err(ReportError::Auth(_))));
    }
}

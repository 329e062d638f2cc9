//! Runs the client with a device certificate loaded from PEM files against a
//! token server that terminates TLS and reads the serial number from it.

use asset_token_client::{config::ConfigFile, AssetTokenClient, AssetTokenClientError, Config};
use asset_token_server::{
    config::ConfigFile as ServerConfigFile, database::memory::InMemoryAssets, server::serve,
    Config as ServerConfig,
};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyUsagePurpose,
};
use std::{fs, path::PathBuf, str::FromStr, sync::Arc};
use tokio::net::TcpListener;

/// CA, server and device certificates written as PEM files to a scratch
/// directory that is removed on drop.
struct TestPki {
    dir: PathBuf,
    device_key_pem: String,
}

impl TestPki {
    fn generate(name: &str, device_serial: u64) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "asset-token-client-{name}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();

        let mut ca_params = CertificateParams::default();
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "Asset token test CA");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let ca = Certificate::from_params(ca_params).unwrap();

        let mut server_params = CertificateParams::new(vec!["localhost".to_string()]);
        server_params
            .distinguished_name
            .push(DnType::CommonName, "localhost");
        let server = Certificate::from_params(server_params).unwrap();

        let mut device_params = CertificateParams::new(vec!["device.local".to_string()]);
        device_params
            .distinguished_name
            .push(DnType::CommonName, "Test device");
        device_params.serial_number = Some(device_serial);
        let device = Certificate::from_params(device_params).unwrap();

        fs::write(dir.join("ca.crt"), ca.serialize_pem().unwrap()).unwrap();
        fs::write(
            dir.join("server.crt"),
            server.serialize_pem_with_signer(&ca).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("server.key"), server.serialize_private_key_pem()).unwrap();
        fs::write(
            dir.join("device.crt"),
            device.serialize_pem_with_signer(&ca).unwrap(),
        )
        .unwrap();
        let device_key_pem = device.serialize_private_key_pem();
        fs::write(dir.join("device.key"), &device_key_pem).unwrap();

        Self {
            dir,
            device_key_pem,
        }
    }

    fn path(&self, file_name: &str) -> String {
        self.dir.join(file_name).display().to_string()
    }

    /// Client config file naming the PEM files. The device key path is left
    /// out when `with_key_path` is false.
    fn client_config_file(&self, server_uri: &str, with_key_path: bool) -> ConfigFile {
        let private_key = if with_key_path {
            format!("private_key = \"{}\"", self.path("device.key"))
        } else {
            String::new()
        };
        let config_str = format!(
            r#"
            server_uri = "{server_uri}"
            ca_chain = "{}"

            [client_auth]
            certificate_chain = "{}"
            {private_key}
            "#,
            self.path("ca.crt"),
            self.path("device.crt"),
        );
        ConfigFile::from_str(&config_str).unwrap()
    }
}

impl Drop for TestPki {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// Starts a TLS-terminating server and returns its URI and inventory.
async fn start_tls_server(pki: &TestPki, serial_numbers: &[&str]) -> (String, Arc<InMemoryAssets>) {
    let config_str = format!(
        r#"
        address = "127.0.0.1"
        port = 0

        [identity]
        source = "tls"

        [tls_config]
        private_key = "{}"
        certificate_chain = "{}"
        client_ca_chain = "{}"

        [logging]
        stdout_log_level = "INFO"
        "#,
        pki.path("server.key"),
        pki.path("server.crt"),
        pki.path("ca.crt"),
    );
    let config =
        ServerConfig::from_config_file(ServerConfigFile::from_str(&config_str).unwrap(), None)
            .unwrap();
    let db = Arc::new(InMemoryAssets::with_serial_numbers(
        serial_numbers.iter().copied(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    std::mem::drop(tokio::spawn(serve(listener, config, db.clone())));

    (format!("https://localhost:{port}"), db)
}

#[tokio::test]
async fn device_certificate_from_pem_files_receives_token() {
    let pki = TestPki::generate("token", 0xA1B2C3);
    let (server_uri, db) = start_tls_server(&pki, &["A1B2C3"]).await;

    let config_file = pki.client_config_file(&server_uri, true);
    let client = AssetTokenClient::new(Config::from_config_file(config_file, None).unwrap());

    let token = client.request_connection_token().await.unwrap();
    assert!(token.is_well_formed());
    assert_eq!(db.find("A1B2C3")[0].connection_token, Some(token));
}

#[tokio::test]
async fn private_key_can_be_passed_as_bytes() {
    let pki = TestPki::generate("key-bytes", 0xA1B2C3);
    let (server_uri, db) = start_tls_server(&pki, &["A1B2C3"]).await;

    let config_file = pki.client_config_file(&server_uri, false);
    let tls_config = config_file
        .tls_config(Some(pki.device_key_pem.clone().into_bytes()))
        .unwrap();
    let client = AssetTokenClient::new(Config {
        server_uri: server_uri.parse().unwrap(),
        tls_config,
    });

    client.health().await.unwrap();
    let token = client.request_connection_token().await.unwrap();
    assert_eq!(db.find("A1B2C3")[0].connection_token, Some(token));
}

#[test]
fn missing_private_key_is_reported() {
    let pki = TestPki::generate("no-key", 0xA1B2C3);

    let config_file = pki.client_config_file("https://localhost:8443", false);
    assert!(matches!(
        config_file.tls_config(None),
        Err(AssetTokenClientError::PrivateKeyMissing)
    ));
}

#[tokio::test]
async fn unprovisioned_device_is_rejected() {
    let pki = TestPki::generate("unprovisioned", 0x0BADF00D);
    let (server_uri, db) = start_tls_server(&pki, &["A1B2C3"]).await;

    let config_file = pki.client_config_file(&server_uri, true);
    let client = AssetTokenClient::new(Config::from_config_file(config_file, None).unwrap());

    let result = client.request_connection_token().await;
    assert!(matches!(result, Err(AssetTokenClientError::Rejected)));
    assert_eq!(db.find("A1B2C3")[0].connection_token, None);
}

//! reqwest-backed implementation of the registry API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{ApiError, PatientApi};
use crate::config::Config;
use crate::models::{Patient, PatientFields};

/// HTTP client for the `/patients` resource
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Build a client from the application configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(&config.http.user_agent);
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the collection
    pub fn patients_url(&self) -> String {
        format!("{}/patients", self.base_url)
    }

    /// URL of a single record, with the identifier percent-encoded
    pub fn patient_url(&self, id: &str) -> Result<String, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::InvalidUrl(format!(
                "{}/<missing id>",
                self.patients_url()
            )));
        }
        Ok(format!("{}/{}", self.patients_url(), urlencoding::encode(id)))
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let headers = format!("{:?}", response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
                headers,
            });
        }

        debug!("{} -> {}", url, status);
        Ok(response.text().await?)
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PatientApi for RestClient {
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let url = self.patients_url();
        debug!("Fetching patient list from {}", url);

        let body = self.send(self.client.get(&url), &url).await?;
        let patients: Vec<Patient> = Self::decode(&url, &body)?;

        info!("Fetched {} patients", patients.len());
        Ok(patients)
    }

    async fn create_patient(&self, fields: &PatientFields) -> Result<Patient, ApiError> {
        let url = self.patients_url();
        let body = self.send(self.client.post(&url).json(fields), &url).await?;
        let patient: Patient = Self::decode(&url, &body)?;

        info!(
            "New patient data submitted successfully: {}",
            patient.id.as_deref().unwrap_or("<no id>")
        );
        Ok(patient)
    }

    async fn update_patient(&self, id: &str, fields: &PatientFields) -> Result<Patient, ApiError> {
        let url = self.patient_url(id)?;
        let body = self.send(self.client.put(&url).json(fields), &url).await?;
        let patient: Patient = Self::decode(&url, &body)?;

        info!("Patient data updated successfully: {}", id);
        Ok(patient)
    }

    async fn delete_patient(&self, id: &str) -> Result<(), ApiError> {
        let url = self.patient_url(id)?;
        self.send(self.client.delete(&url), &url).await?;

        info!("Deleted patient {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::patient;
    use crate::models::{Gender, PaymentType};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Request line and body seen by the stub server
    struct Received {
        request_line: String,
        body: String,
    }

    /// Serve exactly one request with a canned status and body.
    /// Returns the API base URL and a handle yielding what was received.
    async fn serve_once(status: &'static str, response_body: String) -> (String, JoinHandle<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nX-Request-Id: stub-1\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                response_body.len(),
                response_body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            Received {
                request_line: head.lines().next().unwrap_or_default().to_string(),
                body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
            }
        });

        (base, handle)
    }

    fn ann() -> Patient {
        patient("abc", "Ann", "Lee", Gender::Female, PaymentType::Cash)
    }

    fn assert_identifier_free_body(body: &str) {
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 12);
        assert!(!object.contains_key("_id"));
        assert_eq!(object["firstName"], "Ann");
        assert_eq!(object["paymentAmount"], 100.0);
    }

    #[tokio::test]
    async fn test_list_gets_collection() {
        let listing = serde_json::to_string(&vec![ann()]).unwrap();
        let (base, server) = serve_once("200 OK", listing).await;

        let patients = client_for(&base).list_patients().await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "GET /api/patients HTTP/1.1");
        assert_eq!(patients, vec![ann()]);
    }

    #[tokio::test]
    async fn test_create_posts_fields_without_id() {
        let created = serde_json::to_string(&ann()).unwrap();
        let (base, server) = serve_once("201 Created", created).await;

        let saved = client_for(&base).create_patient(&ann().fields()).await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "POST /api/patients HTTP/1.1");
        assert_identifier_free_body(&received.body);
        assert_eq!(saved.id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_update_puts_to_record_path() {
        let updated = serde_json::to_string(&ann()).unwrap();
        let (base, server) = serve_once("200 OK", updated).await;

        client_for(&base)
            .update_patient("abc", &ann().fields())
            .await
            .unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "PUT /api/patients/abc HTTP/1.1");
        assert_identifier_free_body(&received.body);
    }

    #[tokio::test]
    async fn test_delete_targets_record_path() {
        let (base, server) = serve_once("200 OK", String::new()).await;

        client_for(&base).delete_patient("abc").await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "DELETE /api/patients/abc HTTP/1.1");
        assert!(received.body.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_keeps_response_details() {
        let (base, server) = serve_once(
            "422 Unprocessable Entity",
            "{\"message\":\"email is required\"}".to_string(),
        )
        .await;

        let result = client_for(&base).create_patient(&ann().fields()).await;
        server.await.unwrap();

        match result {
            Err(ApiError::Status {
                status,
                body,
                headers,
            }) => {
                assert_eq!(status, 422);
                assert!(body.contains("email is required"));
                assert!(headers.contains("x-request-id"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;

        let result = client_for(&base).list_patients().await;
        server.await.unwrap();

        match result {
            Err(ApiError::Decode { url, .. }) => assert!(url.ends_with("/api/patients")),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    fn client_for(base: &str) -> RestClient {
        let config = Config::default().with_api_base_url(Some(base.to_string()));
        RestClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client_for("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.patients_url(), "http://localhost:5000/api/patients");
        assert_eq!(
            client.patient_url("65f1c0ffee").unwrap(),
            "http://localhost:5000/api/patients/65f1c0ffee"
        );
    }

    #[test]
    fn test_patient_url_encodes_and_rejects_blank_ids() {
        let client = client_for("http://localhost:5000/api");
        assert_eq!(
            client.patient_url("a b/c").unwrap(),
            "http://localhost:5000/api/patients/a%20b%2Fc"
        );
        assert!(matches!(client.patient_url("  "), Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_http_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client = client_for("http://127.0.0.1:9/api");
        let result = client.list_patients().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}

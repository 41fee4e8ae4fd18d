use std::{collections::HashMap, env};

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    consultations::Consultation,
    digibooks::{Digibook, Profile},
    errors::Error,
};

use super::Repository;

type Item = HashMap<String, AttributeValue>;

#[derive(Clone, Debug)]
pub struct DynamoRepository {
    client: Client,
    profiles_table: String,
    digibooks_table: String,
    consultations_table: String,
}

impl DynamoRepository {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            profiles_table: env::var("DYNAMODB_PROFILES_TABLE")
                .unwrap_or("healthbook-profiles".to_string()),
            digibooks_table: env::var("DYNAMODB_DIGIBOOKS_TABLE")
                .unwrap_or("healthbook-digibooks".to_string()),
            consultations_table: env::var("DYNAMODB_CONSULTATIONS_TABLE")
                .unwrap_or("healthbook-consultations".to_string()),
        }
    }

    async fn put<T: Serialize>(&self, table: &str, row: &T) -> Result<(), Error> {
        let item: Item = serde_dynamo::to_item(row)
            .map_err(|e| Error::persistence(format!("Failed to encode row: {}", e)))?;

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, table: &str, key: &str, value: &str) -> Result<Option<T>, Error> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key, AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(&e).to_string()))?;

        output.item.map(decode).transpose()
    }

    async fn query_index<T: DeserializeOwned>(
        &self,
        table: &str,
        index: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<T>, Error> {
        let mut rows = Vec::new();
        let mut start_key: Option<Item> = None;

        // Each query returns at most 1 MB; follow the cursor to the end
        loop {
            let output = self
                .client
                .query()
                .table_name(table)
                .index_name(index)
                .key_condition_expression("#k = :v")
                .expression_attribute_names("#k", key)
                .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| Error::persistence(DisplayErrorContext(&e).to_string()))?;

            for item in output.items.unwrap_or_default() {
                rows.push(decode(item)?);
            }

            match output.last_evaluated_key {
                Some(next) if !next.is_empty() => start_key = Some(next),
                _ => break,
            }
        }

        Ok(rows)
    }
}

fn decode<T: DeserializeOwned>(item: Item) -> Result<T, Error> {
    serde_dynamo::from_item(item).map_err(|e| Error::persistence(format!("Failed to decode row: {}", e)))
}

#[async_trait]
impl Repository for DynamoRepository {
    async fn load_profile(&self, clerk_id: &str) -> Result<Option<Profile>, Error> {
        self.get(&self.profiles_table, "clerk_id", clerk_id).await
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<(), Error> {
        self.put(&self.profiles_table, &profile).await
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, Error> {
        let profiles: Vec<Profile> = self
            .query_index(&self.profiles_table, "email-index", "email", email)
            .await?;
        Ok(profiles.into_iter().next())
    }

    async fn load_digibook(&self, user_id: &str) -> Result<Option<Digibook>, Error> {
        self.get(&self.digibooks_table, "clerk_user_id", user_id).await
    }

    async fn save_digibook(&self, digibook: Digibook) -> Result<(), Error> {
        self.put(&self.digibooks_table, &digibook).await
    }

    async fn insert_consultation(&self, consultation: Consultation) -> Result<(), Error> {
        self.put(&self.consultations_table, &consultation).await
    }

    async fn list_consultations(&self, user_id: &str) -> Result<Vec<Consultation>, Error> {
        let mut rows: Vec<Consultation> = self
            .query_index(&self.consultations_table, "user_id-index", "user_id", user_id)
            .await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };

    use super::*;

    type Seen = Arc<Mutex<Vec<String>>>;

    /// Reads one HTTP/1.1 request off the socket and returns its body.
    async fn read_request(socket: &mut TcpStream, buf: &mut Vec<u8>) -> Option<String> {
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let total = end + 4 + length;
                if buf.len() >= total {
                    let body = String::from_utf8_lossy(&buf[end + 4..total]).to_string();
                    buf.drain(..total);
                    return Some(body);
                }
            }

            let mut chunk = [0u8; 4096];
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Local endpoint answering each request with the next scripted page.
    async fn dynamo_stub(pages: Vec<&str>) -> (String, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let pages: Arc<Mutex<VecDeque<String>>> =
            Arc::new(Mutex::new(pages.into_iter().map(str::to_string).collect()));
        let seen = Seen::default();

        let requests = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let pages = pages.clone();
                let requests = requests.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    while let Some(body) = read_request(&mut socket, &mut buf).await {
                        requests.lock().unwrap().push(body);
                        let page = pages.lock().unwrap().pop_front().unwrap_or_default();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\ncontent-type: application/x-amz-json-1.0\r\ncontent-length: {}\r\n\r\n{}",
                            page.len(),
                            page
                        );
                        if socket.write_all(response.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn repository(endpoint: &str) -> DynamoRepository {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .endpoint_url(endpoint)
            .build();
        DynamoRepository::new(Client::from_conf(config))
    }

    fn row(id: &str, created_at: &str) -> String {
        format!(
            r#"{{"id":{{"S":"{id}"}},"user_id":{{"S":"user_1"}},"patient_email":{{"S":"ngwa@example.cm"}},"consultation_items":{{"L":[]}},"summary_notes":{{"S":""}},"total_fee":{{"N":"0"}},"created_at":{{"S":"{created_at}"}}}}"#
        )
    }

    #[tokio::test]
    async fn list_consultations_follows_every_page() {
        let first = format!(
            r#"{{"Items":[{}],"Count":1,"LastEvaluatedKey":{{"id":{{"S":"c1"}},"user_id":{{"S":"user_1"}}}}}}"#,
            row("c1", "2025-01-01T08:00:00Z")
        );
        let second = format!(
            r#"{{"Items":[{}],"Count":1}}"#,
            row("c2", "2025-02-01T08:00:00Z")
        );
        let (endpoint, seen) = dynamo_stub(vec![&first, &second]).await;

        let rows = repository(&endpoint).list_consultations("user_1").await.unwrap();

        let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].contains("ExclusiveStartKey"));
        assert!(requests[1].contains("ExclusiveStartKey"));
    }
}

//! Table reads and inserts against the REST endpoint of the backend.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{error::ClientError, BookingClient};

/// A read or insert on one table, narrowed by equality filters.
///
/// ```ignore
/// let courts: Vec<Court> = client.from("courts").eq("is_active", true).fetch().await?;
/// ```
pub struct TableQuery<'a> {
    client: &'a BookingClient,
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
}

impl<'a> TableQuery<'a> {
    pub(crate) fn new(client: &'a BookingClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    fn url(&self) -> Result<url::Url, ClientError> {
        let mut url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &self.columns);
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
        }
        Ok(url)
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, ClientError> {
        let url = self.url()?;
        debug!(table = %self.table, filters = self.filters.len(), "fetching rows");
        let request = self.client.authorized(self.client.http.get(url)).await;
        let response = crate::check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// First matching row, if any.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, ClientError> {
        let rows = self.fetch::<T>().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<T: Serialize + Sync>(self, rows: &[T]) -> Result<(), ClientError> {
        let url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        debug!(table = %self.table, rows = rows.len(), "inserting rows");
        let request = self
            .client
            .authorized(self.client.http.post(url))
            .await
            .header("Prefer", "return=minimal")
            .json(rows);
        crate::check_status(request.send().await?).await?;
        Ok(())
    }
}

use at_api_types::{
    RECORD_INDEX_KEY, Record, RecordEntry, RecordInput, RecordStatus, record_key,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::{Clock, ContractGateway, GatewayError, StoreError};

/// Marker in front of the encoded form. Not encryption.
pub const PAYLOAD_PREFIX: &str = "FHE-AIR-";

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct RecordStore<G, C> {
    gateway: G,
    clock: C,
}

impl<G, C> RecordStore<G, C>
where
    G: ContractGateway,
    C: Clock,
{
    pub fn new(gateway: G, clock: C) -> Self {
        Self { gateway, clock }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Load every record reachable from the index, newest first.
    ///
    /// Never fails: an unavailable gateway or unreadable index yields an empty
    /// list, and individual entries that are missing or corrupt are skipped.
    pub async fn list(&self) -> Vec<Record> {
        match self.gateway.is_available().await {
            Ok(true) => {}
            Ok(false) => {
                error!("contract gateway reports it is not available");
                return Vec::new();
            }
            Err(err) => {
                error!("error checking gateway availability: {}", err);
                return Vec::new();
            }
        }

        let ids = match self.read_index().await {
            Ok(ids) => ids,
            Err(err) => {
                error!("error loading record index: {}", err);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.fetch(&id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(%id, "index references a record with no entry"),
                Err(err) => warn!(%id, "skipping record: {}", err),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let raw = self.gateway.get_data(&record_key(id)).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        let entry: RecordEntry =
            serde_json::from_slice(&raw).map_err(|err| StoreError::Corrupt {
                id: id.to_owned(),
                reason: err.to_string(),
            })?;
        Ok(Some(Record::from_entry(id, entry)))
    }

    /// Validate, write the record entry, then append its id to the index.
    ///
    /// The two writes are not atomic. A failure after the first one leaves the
    /// entry unreferenced and is reported as [`StoreError::Orphaned`].
    pub async fn create(&self, input: &RecordInput) -> Result<Record, StoreError> {
        let flight_count = validate_input(input)?;

        let now_ms = self.clock.now_ms();
        let record = Record {
            id: new_record_id(now_ms, &mut rand::thread_rng()),
            payload: encode_payload(input)?,
            created_at: now_ms / 1000,
            origin: input.origin.trim().to_owned(),
            destination: input.destination.trim().to_owned(),
            flight_count,
            status: RecordStatus::Pending,
        };

        let entry = serde_json::to_vec(&record.to_entry())?;
        self.gateway.set_data(&record_key(&record.id), &entry).await?;

        let orphaned = |source: GatewayError| {
            error!(id = %record.id, "record written but not indexed: {}", source);
            StoreError::Orphaned {
                id: record.id.clone(),
                source,
            }
        };

        let mut ids = self.read_index().await.map_err(orphaned)?;
        ids.push(record.id.clone());
        let index = serde_json::to_vec(&ids)?;
        self.gateway
            .set_data(RECORD_INDEX_KEY, &index)
            .await
            .map_err(orphaned)?;

        info!(id = %record.id, "record submitted");
        Ok(record)
    }

    /// Replace the stored status, leaving every other stored field untouched.
    pub async fn set_status(&self, id: &str, status: RecordStatus) -> Result<(), StoreError> {
        let key = record_key(id);
        let raw = self.gateway.get_data(&key).await?;
        if raw.is_empty() {
            return Err(StoreError::NotFound(id.to_owned()));
        }

        let mut object: Map<String, Value> =
            serde_json::from_slice(&raw).map_err(|err| StoreError::Corrupt {
                id: id.to_owned(),
                reason: err.to_string(),
            })?;
        object.insert("status".to_owned(), Value::String(status.as_str().to_owned()));

        let updated = serde_json::to_vec(&object)?;
        self.gateway.set_data(&key, &updated).await?;
        info!(%id, %status, "record status updated");
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>, GatewayError> {
        let raw = self.gateway.get_data(RECORD_INDEX_KEY).await?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_slice::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                warn!("error parsing record index, treating as empty: {}", err);
                Ok(Vec::new())
            }
        }
    }
}

/// Returns the parsed flight count when the required fields are present.
pub fn validate_input(input: &RecordInput) -> Result<u64, StoreError> {
    if !input.has_required_fields() {
        return Err(StoreError::Validation("Please fill required fields".to_owned()));
    }
    input.flight_count.trim().parse::<u64>().map_err(|_| {
        StoreError::Validation("Flight count must be a non-negative whole number".to_owned())
    })
}

pub fn encode_payload(input: &RecordInput) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(input)?;
    Ok(format!("{PAYLOAD_PREFIX}{}", STANDARD.encode(json)))
}

/// `{unix_ms}-{7 base36 chars}`.
pub fn new_record_id<R: Rng + ?Sized>(now_ms: u64, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{now_ms}-{suffix}")
}

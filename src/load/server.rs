use std::{
    cmp::Ordering,
    collections::BTreeMap,
    hash::{Hash, Hasher},
    io::Cursor,
};

use bytes::Buf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::util::strings::append_key_value;

use super::{cfg::LOAD_REPORT_VERSION, error::Error, region::RegionLoad};

/// Aggregate load report for one region server, shipped to the master on
/// every report interval.
#[derive(Debug, Clone, Default)]
pub struct ServerLoad {
    // could just be region_load.len(), but the master's region manager
    // adjusts this value while passing reports around during balancer
    // calculations
    number_of_regions: i32,
    number_of_requests: i32,
    used_heap_mb: i32,
    max_heap_mb: i32,
    region_load: BTreeMap<Vec<u8>, RegionLoad>,
}

impl ServerLoad {
    pub fn new(number_of_requests: i32, used_heap_mb: i32, max_heap_mb: i32) -> ServerLoad {
        ServerLoad {
            number_of_regions: 0,
            number_of_requests,
            used_heap_mb,
            max_heap_mb,
            region_load: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> u8 {
        LOAD_REPORT_VERSION
    }

    /// Load factor used to rank servers for balancing.
    pub fn load(&self) -> i32 {
        // Request count used to factor in here as well, but the region
        // rebalancer only understands region counts.
        // let mut load = if self.number_of_requests == 0 { 1 } else { self.number_of_requests };
        // load *= if self.number_of_regions == 0 { 1 } else { self.number_of_regions };
        self.number_of_regions
    }

    /// Difference of the two load factors; only the sign is meaningful.
    pub fn compare_to(&self, other: &ServerLoad) -> i32 {
        self.load() - other.load()
    }

    pub fn number_of_regions(&self) -> i32 {
        self.number_of_regions
    }

    pub fn number_of_requests(&self) -> i32 {
        self.number_of_requests
    }

    pub fn used_heap_mb(&self) -> i32 {
        self.used_heap_mb
    }

    pub fn max_heap_mb(&self) -> i32 {
        self.max_heap_mb
    }

    pub fn region_loads(&self) -> &BTreeMap<Vec<u8>, RegionLoad> {
        &self.region_load
    }

    pub fn storefiles(&self) -> i32 {
        self.region_load.values().map(RegionLoad::storefiles).sum()
    }

    pub fn storefile_size_mb(&self) -> i32 {
        self.region_load
            .values()
            .map(RegionLoad::storefile_size_mb)
            .sum()
    }

    pub fn memstore_size_mb(&self) -> i32 {
        self.region_load
            .values()
            .map(RegionLoad::memstore_size_mb)
            .sum()
    }

    pub fn storefile_index_size_mb(&self) -> i32 {
        self.region_load
            .values()
            .map(RegionLoad::storefile_index_size_mb)
            .sum()
    }

    pub fn set_number_of_regions(&mut self, number_of_regions: i32) {
        self.number_of_regions = number_of_regions;
    }

    pub fn set_number_of_requests(&mut self, number_of_requests: i32) {
        self.number_of_requests = number_of_requests;
    }

    pub fn set_used_heap_mb(&mut self, used_heap_mb: i32) {
        self.used_heap_mb = used_heap_mb;
    }

    pub fn set_max_heap_mb(&mut self, max_heap_mb: i32) {
        self.max_heap_mb = max_heap_mb;
    }

    /// Counts the region even when it replaces an entry with the same name,
    /// so the counter can run ahead of the map.
    pub fn add_region_info(&mut self, load: RegionLoad) {
        self.number_of_regions += 1;
        self.region_load.insert(load.name().to_vec(), load);
    }

    #[deprecated(note = "construct a RegionLoad and use add_region_info")]
    pub fn add_region_fields(
        &mut self,
        name: Vec<u8>,
        stores: i32,
        storefiles: i32,
        storefile_size_mb: i32,
        memstore_size_mb: i32,
        storefile_index_size_mb: i32,
        read_requests_count: i32,
        write_requests_count: i32,
    ) {
        // goes straight into the map, number_of_regions stays untouched
        self.region_load.insert(
            name.clone(),
            RegionLoad::new(
                name,
                stores,
                storefiles,
                storefile_size_mb,
                memstore_size_mb,
                storefile_index_size_mb,
                read_requests_count,
                write_requests_count,
            ),
        );
    }

    /// Requests scaled down by the report interval in seconds; the caller
    /// keeps `msg_interval` above zero.
    pub fn summary(&self, msg_interval: i32) -> String {
        let mut out = String::new();
        append_key_value(&mut out, "requests", self.number_of_requests / msg_interval);
        append_key_value(&mut out, "regions", self.number_of_regions);
        append_key_value(&mut out, "usedHeap", self.used_heap_mb);
        append_key_value(&mut out, "maxHeap", self.max_heap_mb);
        out
    }

    fn header_len() -> usize {
        // version, number_of_requests, used_heap_mb, max_heap_mb, number_of_regions
        1 + 4 + 4 + 4 + 4
    }

    pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
        if src.remaining() < ServerLoad::header_len() {
            return Err(Error::InComplete);
        }
        let version = src.get_u8();
        if version != LOAD_REPORT_VERSION {
            return Err(Error::BadVersion(version));
        }
        src.advance(12);
        let number_of_regions = src.get_i32();
        for _ in 0..number_of_regions {
            RegionLoad::check(src)?;
        }
        Ok(())
    }

    pub fn parse<B: Buf>(src: &mut B) -> Result<ServerLoad, Error> {
        let version = src.get_u8();
        if version != LOAD_REPORT_VERSION {
            return Err(Error::BadVersion(version));
        }

        let number_of_requests = src.get_i32();
        let used_heap_mb = src.get_i32();
        let max_heap_mb = src.get_i32();
        let number_of_regions = src.get_i32();

        let mut region_load = BTreeMap::new();
        for _ in 0..number_of_regions {
            insert_region(&mut region_load, RegionLoad::parse(src));
        }

        Ok(ServerLoad {
            number_of_regions,
            number_of_requests,
            used_heap_mb,
            max_heap_mb,
            region_load,
        })
    }

    pub async fn serialize<W: AsyncWriteExt + Unpin>(&self, writer: &mut W) -> Result<(), Error> {
        let mut header = [0u8; 17];
        header[0] = LOAD_REPORT_VERSION;
        header[1..5].copy_from_slice(&self.number_of_requests.to_be_bytes());
        header[5..9].copy_from_slice(&self.used_heap_mb.to_be_bytes());
        header[9..13].copy_from_slice(&self.max_heap_mb.to_be_bytes());
        header[13..17].copy_from_slice(&self.number_of_regions.to_be_bytes());

        writer.write_all(&header).await?;

        for load in self.region_load.values() {
            load.serialize(writer).await?;
        }

        writer.flush().await?;
        Ok(())
    }

    pub async fn deserialize<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<ServerLoad, Error> {
        let version = reader.read_u8().await?;
        if version != LOAD_REPORT_VERSION {
            return Err(Error::BadVersion(version));
        }

        let mut header = [0u8; 16];
        reader.read_exact(&mut header).await?;

        let number_of_requests = i32::from_be_bytes(header[0..4].try_into().unwrap());
        let used_heap_mb = i32::from_be_bytes(header[4..8].try_into().unwrap());
        let max_heap_mb = i32::from_be_bytes(header[8..12].try_into().unwrap());
        let number_of_regions = i32::from_be_bytes(header[12..16].try_into().unwrap());

        let mut region_load = BTreeMap::new();
        for _ in 0..number_of_regions {
            let load = RegionLoad::deserialize(reader).await?;
            insert_region(&mut region_load, load);
        }

        Ok(ServerLoad {
            number_of_regions,
            number_of_requests,
            used_heap_mb,
            max_heap_mb,
            region_load,
        })
    }
}

fn insert_region(map: &mut BTreeMap<Vec<u8>, RegionLoad>, load: RegionLoad) {
    let key = load.name().to_vec();
    if let Some(prev) = map.insert(key, load) {
        tracing::warn!(region = %prev.name_as_string(), "Duplicate region in load report");
    }
}

/// Two reports compare equal when they carry the same load factor,
/// regardless of what their region maps hold.
impl PartialEq for ServerLoad {
    fn eq(&self, other: &ServerLoad) -> bool {
        self.compare_to(other) == 0
    }
}

impl Eq for ServerLoad {}

impl PartialOrd for ServerLoad {
    fn partial_cmp(&self, other: &ServerLoad) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerLoad {
    fn cmp(&self, other: &ServerLoad) -> Ordering {
        self.load().cmp(&other.load())
    }
}

/// The request count feeds the hash but not equality; kept that way for
/// compatibility with existing consumers of these reports.
impl Hash for ServerLoad {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number_of_requests.hash(state);
        self.number_of_regions.hash(state);
    }
}

impl std::fmt::Display for ServerLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.summary(1).fmt(f)
    }
}

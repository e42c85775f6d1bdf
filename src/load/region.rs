use std::io::Cursor;

use bytes::Buf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::util::strings::append_key_value;

use super::error::Error;

/// Per-region load metrics reported by a region server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionLoad {
    name: Vec<u8>,
    stores: i32,
    storefiles: i32,
    storefile_size_mb: i32,
    memstore_size_mb: i32,
    storefile_index_size_mb: i32,
    read_requests_count: i32,
    write_requests_count: i32,
}

impl RegionLoad {
    pub fn new(
        name: Vec<u8>,
        stores: i32,
        storefiles: i32,
        storefile_size_mb: i32,
        memstore_size_mb: i32,
        storefile_index_size_mb: i32,
        read_requests_count: i32,
        write_requests_count: i32,
    ) -> RegionLoad {
        RegionLoad {
            name,
            stores,
            storefiles,
            storefile_size_mb,
            memstore_size_mb,
            storefile_index_size_mb,
            read_requests_count,
            write_requests_count,
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Lossy UTF-8 rendering of the raw region name, for display only.
    pub fn name_as_string(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn stores(&self) -> i32 {
        self.stores
    }

    pub fn storefiles(&self) -> i32 {
        self.storefiles
    }

    pub fn storefile_size_mb(&self) -> i32 {
        self.storefile_size_mb
    }

    pub fn memstore_size_mb(&self) -> i32 {
        self.memstore_size_mb
    }

    pub fn storefile_index_size_mb(&self) -> i32 {
        self.storefile_index_size_mb
    }

    pub fn read_requests_count(&self) -> i32 {
        self.read_requests_count
    }

    pub fn write_requests_count(&self) -> i32 {
        self.write_requests_count
    }

    /// Read and write requests combined, widened so sums over many regions
    /// cannot overflow.
    pub fn requests_count(&self) -> i64 {
        self.read_requests_count as i64 + self.write_requests_count as i64
    }

    pub fn set_name(&mut self, name: Vec<u8>) {
        self.name = name;
    }

    pub fn set_stores(&mut self, stores: i32) {
        self.stores = stores;
    }

    pub fn set_storefiles(&mut self, storefiles: i32) {
        self.storefiles = storefiles;
    }

    pub fn set_storefile_size_mb(&mut self, storefile_size_mb: i32) {
        self.storefile_size_mb = storefile_size_mb;
    }

    pub fn set_memstore_size_mb(&mut self, memstore_size_mb: i32) {
        self.memstore_size_mb = memstore_size_mb;
    }

    pub fn set_storefile_index_size_mb(&mut self, storefile_index_size_mb: i32) {
        self.storefile_index_size_mb = storefile_index_size_mb;
    }

    pub fn set_read_requests_count(&mut self, requests_count: i32) {
        self.read_requests_count = requests_count;
    }

    pub fn set_write_requests_count(&mut self, requests_count: i32) {
        self.write_requests_count = requests_count;
    }

    fn metrics_len() -> usize {
        // stores, storefiles, storefile_size_mb, memstore_size_mb,
        // storefile_index_size_mb, read_requests_count, write_requests_count
        7 * 4
    }

    pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
        if src.remaining() < 4 {
            return Err(Error::InComplete);
        }
        let name_len = src.get_u32() as usize;
        if src.remaining() < name_len + RegionLoad::metrics_len() {
            return Err(Error::InComplete);
        }
        src.advance(name_len + RegionLoad::metrics_len());
        Ok(())
    }

    pub fn parse<B: Buf>(src: &mut B) -> RegionLoad {
        let name_len = src.get_u32() as usize;
        let mut name = vec![0; name_len];
        src.copy_to_slice(&mut name);

        RegionLoad {
            name,
            stores: src.get_i32(),
            storefiles: src.get_i32(),
            storefile_size_mb: src.get_i32(),
            memstore_size_mb: src.get_i32(),
            storefile_index_size_mb: src.get_i32(),
            read_requests_count: src.get_i32(),
            write_requests_count: src.get_i32(),
        }
    }

    pub async fn serialize<W: AsyncWriteExt + Unpin>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_u32(self.name.len() as u32).await?;
        writer.write_all(&self.name).await?;

        let mut buffer = [0u8; 28];
        buffer[0..4].copy_from_slice(&self.stores.to_be_bytes());
        buffer[4..8].copy_from_slice(&self.storefiles.to_be_bytes());
        buffer[8..12].copy_from_slice(&self.storefile_size_mb.to_be_bytes());
        buffer[12..16].copy_from_slice(&self.memstore_size_mb.to_be_bytes());
        buffer[16..20].copy_from_slice(&self.storefile_index_size_mb.to_be_bytes());
        buffer[20..24].copy_from_slice(&self.read_requests_count.to_be_bytes());
        buffer[24..28].copy_from_slice(&self.write_requests_count.to_be_bytes());

        writer.write_all(&buffer).await?;
        Ok(())
    }

    pub async fn deserialize<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<RegionLoad, Error> {
        let name_len = reader.read_u32().await? as usize;
        let mut name = vec![0; name_len];
        reader.read_exact(&mut name).await?;

        let mut buffer = [0u8; 28];
        reader.read_exact(&mut buffer).await?;

        Ok(RegionLoad {
            name,
            stores: i32::from_be_bytes(buffer[0..4].try_into().unwrap()),
            storefiles: i32::from_be_bytes(buffer[4..8].try_into().unwrap()),
            storefile_size_mb: i32::from_be_bytes(buffer[8..12].try_into().unwrap()),
            memstore_size_mb: i32::from_be_bytes(buffer[12..16].try_into().unwrap()),
            storefile_index_size_mb: i32::from_be_bytes(buffer[16..20].try_into().unwrap()),
            read_requests_count: i32::from_be_bytes(buffer[20..24].try_into().unwrap()),
            write_requests_count: i32::from_be_bytes(buffer[24..28].try_into().unwrap()),
        })
    }
}

impl std::fmt::Display for RegionLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        append_key_value(&mut out, "stores", self.stores);
        append_key_value(&mut out, "storefiles", self.storefiles);
        append_key_value(&mut out, "storefileSizeMB", self.storefile_size_mb);
        append_key_value(&mut out, "memstoreSizeMB", self.memstore_size_mb);
        append_key_value(&mut out, "storefileIndexSizeMB", self.storefile_index_size_mb);
        append_key_value(&mut out, "readRequestsCount", self.read_requests_count);
        append_key_value(&mut out, "writeRequestsCount", self.write_requests_count);
        out.fmt(f)
    }
}

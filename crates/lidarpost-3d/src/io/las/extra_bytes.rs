use ::las::Vlr;

use super::LasError;

/// User ID of the Extra Bytes VLR.
pub(crate) const EXTRA_BYTES_USER_ID: &str = "LASF_Spec";
/// Record ID of the Extra Bytes VLR.
pub(crate) const EXTRA_BYTES_RECORD_ID: u16 = 4;

const DESCRIPTOR_SIZE: usize = 192;
const NAME_OFFSET: usize = 4;
/// Size of the name field of an extra bytes descriptor.
pub(crate) const NAME_SIZE: usize = 32;
const SCALE_OFFSET: usize = 112;
const OFFSET_OFFSET: usize = 136;

const OPTION_SCALE: u8 = 1 << 3;
const OPTION_OFFSET: u8 = 1 << 4;

/// LAS 1.4 extra bytes data type of an `f64` value.
const DATA_TYPE_F64: u8 = 10;

/// One dimension described by the Extra Bytes VLR.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtraBytesDimension {
    pub name: String,
    data_type: u8,
    // byte offset of the value inside the point's extra bytes
    start: usize,
    size: usize,
    scale: Option<f64>,
    offset: Option<f64>,
}

impl ExtraBytesDimension {
    /// Decode the value of this dimension from a point's extra bytes.
    pub fn decode(&self, extra_bytes: &[u8]) -> Result<f64, LasError> {
        let bytes = extra_bytes
            .get(self.start..self.start + self.size)
            .ok_or(LasError::MalformedExtraBytes)?;

        macro_rules! le {
            ($t:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf) as f64
            }};
        }

        let raw = match self.data_type {
            1 => le!(u8),
            2 => le!(i8),
            3 => le!(u16),
            4 => le!(i16),
            5 => le!(u32),
            6 => le!(i32),
            7 => le!(u64),
            8 => le!(i64),
            9 => le!(f32),
            10 => le!(f64),
            other => return Err(LasError::UnsupportedExtraBytes(other)),
        };

        Ok(raw * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0))
    }
}

fn data_type_size(data_type: u8, options: u8) -> Result<usize, LasError> {
    match data_type {
        // undocumented bytes, the options field holds the byte count
        0 => Ok(options as usize),
        1 | 2 => Ok(1),
        3 | 4 => Ok(2),
        5 | 6 | 9 => Ok(4),
        7 | 8 | 10 => Ok(8),
        other => Err(LasError::UnsupportedExtraBytes(other)),
    }
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

/// Find and parse the Extra Bytes VLR among the header records.
///
/// Undocumented byte ranges are skipped; returns an empty list without a record.
pub(crate) fn parse_extra_bytes<'a>(
    vlrs: impl IntoIterator<Item = &'a Vlr>,
) -> Result<Vec<ExtraBytesDimension>, LasError> {
    let Some(vlr) = vlrs
        .into_iter()
        .find(|vlr| vlr.user_id == EXTRA_BYTES_USER_ID && vlr.record_id == EXTRA_BYTES_RECORD_ID)
    else {
        return Ok(Vec::new());
    };

    if vlr.data.len() % DESCRIPTOR_SIZE != 0 {
        return Err(LasError::MalformedExtraBytes);
    }

    let mut dimensions = Vec::new();
    let mut start = 0usize;

    for descriptor in vlr.data.chunks_exact(DESCRIPTOR_SIZE) {
        let data_type = descriptor[2];
        let options = descriptor[3];
        let size = data_type_size(data_type, options)?;

        if data_type != 0 {
            let name_bytes = &descriptor[NAME_OFFSET..NAME_OFFSET + NAME_SIZE];
            let name_len = name_bytes
                .iter()
                .position(|b| *b == 0)
                .unwrap_or(NAME_SIZE);
            let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

            dimensions.push(ExtraBytesDimension {
                name,
                data_type,
                start,
                size,
                scale: (options & OPTION_SCALE != 0).then(|| read_f64(descriptor, SCALE_OFFSET)),
                offset: (options & OPTION_OFFSET != 0)
                    .then(|| read_f64(descriptor, OFFSET_OFFSET)),
            });
        }
        start += size;
    }

    Ok(dimensions)
}

/// Build the Extra Bytes VLR declaring one `f64` dimension per name.
///
/// # Errors
///
/// Returns [`LasError::AttributeNameTooLong`] if a name exceeds [`NAME_SIZE`] bytes.
pub(crate) fn extra_bytes_vlr<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vlr, LasError> {
    let mut data = Vec::new();
    for name in names {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > NAME_SIZE {
            return Err(LasError::AttributeNameTooLong(name.to_string()));
        }
        let mut descriptor = [0u8; DESCRIPTOR_SIZE];
        descriptor[2] = DATA_TYPE_F64;
        descriptor[NAME_OFFSET..NAME_OFFSET + name_bytes.len()].copy_from_slice(name_bytes);
        data.extend_from_slice(&descriptor);
    }

    Ok(Vlr {
        user_id: EXTRA_BYTES_USER_ID.to_string(),
        record_id: EXTRA_BYTES_RECORD_ID,
        description: "Extra Bytes Record".to_string(),
        data,
    })
}

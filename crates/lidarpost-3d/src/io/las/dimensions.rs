use ::las::point::{Classification, Format, ScanDirection};
use ::las::{Color, Point};

use super::LasError;

const OVERLAP_CLASSIFICATION: u8 = 12;

/// The standard per-point dimensions of the LAS point formats, besides X, Y and Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardDimension {
    /// Pulse return magnitude.
    Intensity,
    /// Return number of the pulse.
    ReturnNumber,
    /// Total number of returns of the pulse.
    NumberOfReturns,
    /// Scan direction, 1 for left to right.
    ScanDirectionFlag,
    /// 1 at the end of a scan line.
    EdgeOfFlightLine,
    /// ASPRS classification code.
    Classification,
    /// Synthetic point flag.
    Synthetic,
    /// Key point flag.
    KeyPoint,
    /// Withheld flag.
    Withheld,
    /// Overlap flag, class 12 in the legacy formats.
    Overlap,
    /// Scanner channel, extended formats only.
    ScannerChannel,
    /// User data byte.
    UserData,
    /// Scan angle in degrees.
    ScanAngle,
    /// Point source ID.
    PointSourceId,
    /// GPS time.
    GpsTime,
    /// Red color channel.
    Red,
    /// Green color channel.
    Green,
    /// Blue color channel.
    Blue,
    /// Near infrared channel.
    Nir,
}

impl StandardDimension {
    /// All standard dimensions in LAS record order.
    pub const ALL: [StandardDimension; 19] = [
        Self::Intensity,
        Self::ReturnNumber,
        Self::NumberOfReturns,
        Self::ScanDirectionFlag,
        Self::EdgeOfFlightLine,
        Self::Classification,
        Self::Synthetic,
        Self::KeyPoint,
        Self::Withheld,
        Self::Overlap,
        Self::ScannerChannel,
        Self::UserData,
        Self::ScanAngle,
        Self::PointSourceId,
        Self::GpsTime,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Nir,
    ];

    /// The attribute name of the dimension.
    pub fn name(self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::ReturnNumber => "return_number",
            Self::NumberOfReturns => "number_of_returns",
            Self::ScanDirectionFlag => "scan_direction_flag",
            Self::EdgeOfFlightLine => "edge_of_flight_line",
            Self::Classification => "classification",
            Self::Synthetic => "synthetic",
            Self::KeyPoint => "key_point",
            Self::Withheld => "withheld",
            Self::Overlap => "overlap",
            Self::ScannerChannel => "scanner_channel",
            Self::UserData => "user_data",
            Self::ScanAngle => "scan_angle",
            Self::PointSourceId => "point_source_id",
            Self::GpsTime => "gps_time",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Nir => "nir",
        }
    }

    /// Look up a dimension by its attribute name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dim| dim.name() == name)
    }

    /// Check whether a point format stores this dimension.
    pub fn is_in(self, format: &Format) -> bool {
        match self {
            Self::ScannerChannel => format.is_extended,
            Self::GpsTime => format.has_gps_time,
            Self::Red | Self::Green | Self::Blue => format.has_color,
            Self::Nir => format.has_nir,
            _ => true,
        }
    }

    /// Read the dimension of a point as a scalar.
    pub fn read(self, point: &Point) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let color = |f: fn(&Color) -> u16| point.color.as_ref().map_or(0.0, |c| f(c) as f64);
        match self {
            Self::Intensity => point.intensity as f64,
            Self::ReturnNumber => point.return_number as f64,
            Self::NumberOfReturns => point.number_of_returns as f64,
            Self::ScanDirectionFlag => flag(point.scan_direction == ScanDirection::LeftToRight),
            Self::EdgeOfFlightLine => flag(point.is_edge_of_flight_line),
            Self::Classification => u8::from(point.classification) as f64,
            Self::Synthetic => flag(point.is_synthetic),
            Self::KeyPoint => flag(point.is_key_point),
            Self::Withheld => flag(point.is_withheld),
            Self::Overlap => flag(point.is_overlap),
            Self::ScannerChannel => point.scanner_channel as f64,
            Self::UserData => point.user_data as f64,
            Self::ScanAngle => point.scan_angle as f64,
            Self::PointSourceId => point.point_source_id as f64,
            Self::GpsTime => point.gps_time.unwrap_or(0.0),
            Self::Red => color(|c| c.red),
            Self::Green => color(|c| c.green),
            Self::Blue => color(|c| c.blue),
            Self::Nir => point.nir.map_or(0.0, |v| v as f64),
        }
    }

    /// Store a scalar into the dimension of a point.
    ///
    /// Integer dimensions saturate at the bounds of their storage type. The legacy
    /// overlap class 12 sets the overlap flag and leaves the point unclassified,
    /// and a set overlap flag is never cleared again.
    pub fn write(self, point: &mut Point, value: f64) -> Result<(), LasError> {
        let flag = value != 0.0;
        match self {
            Self::Intensity => point.intensity = value as u16,
            Self::ReturnNumber => point.return_number = value as u8,
            Self::NumberOfReturns => point.number_of_returns = value as u8,
            Self::ScanDirectionFlag => {
                point.scan_direction = if flag {
                    ScanDirection::LeftToRight
                } else {
                    ScanDirection::RightToLeft
                }
            }
            Self::EdgeOfFlightLine => point.is_edge_of_flight_line = flag,
            Self::Classification => match value as u8 {
                OVERLAP_CLASSIFICATION => {
                    point.classification = Classification::CreatedNeverClassified;
                    point.is_overlap = true;
                }
                code => point.classification = Classification::new(code)?,
            },
            Self::Synthetic => point.is_synthetic = flag,
            Self::KeyPoint => point.is_key_point = flag,
            Self::Withheld => point.is_withheld = flag,
            Self::Overlap => point.is_overlap |= flag,
            Self::ScannerChannel => point.scanner_channel = value as u8,
            Self::UserData => point.user_data = value as u8,
            Self::ScanAngle => point.scan_angle = value as f32,
            Self::PointSourceId => point.point_source_id = value as u16,
            Self::GpsTime => point.gps_time = Some(value),
            Self::Red => point.color.get_or_insert_with(Color::default).red = value as u16,
            Self::Green => point.color.get_or_insert_with(Color::default).green = value as u16,
            Self::Blue => point.color.get_or_insert_with(Color::default).blue = value as u16,
            Self::Nir => point.nir = Some(value as u16),
        }
        Ok(())
    }
}

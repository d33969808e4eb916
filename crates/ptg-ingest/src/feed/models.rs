// Schedule feed data models
//
// The publisher abbreviates every key. Only the fields the ingester reads are
// modelled; everything else (poster notes, connections, stop types, ...) is
// skipped by serde.
//
// | Short | Long                         |
// |-------|------------------------------|
// | sid   | scheduleId                   |
// | oid   | orderId                      |
// | nm    | name                         |
// | cc    | carrierCode                  |
// | nn    | nationalNumber               |
// | ian   | internationalArrivalNumber   |
// | idn   | internationalDepartureNumber |
// | ccs   | commercialCategorySymbol     |
// | od    | operatingDates               |
// | st    | stations                     |
// | id    | stationId                    |
// | ord   | orderNumber                  |
// | atm   | arrivalTime                  |
// | ady   | arrivalDay                   |
// | apl   | arrivalPlatform              |
// | atr   | arrivalTrack                 |
// | dtm   | departureTime                |
// | ddy   | departureDay                 |
// | dpl   | departurePlatform            |
// | dtr   | departureTrack               |

use serde::Deserialize;

/// One schedule entry: a single train run and its ordered stops
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteBlock {
    #[serde(rename = "sid")]
    pub schedule_id: i64,

    #[serde(rename = "oid")]
    pub order_id: i64,

    #[serde(rename = "nm", default)]
    pub name: Option<String>,

    #[serde(rename = "cc")]
    pub carrier_code: String,

    /// Carrier-internal train number
    #[serde(rename = "nn", default)]
    pub national_number: Option<String>,

    #[serde(rename = "ian", default)]
    pub international_arrival_number: Option<String>,

    #[serde(rename = "idn", default)]
    pub international_departure_number: Option<String>,

    #[serde(rename = "ccs")]
    pub category_symbol: String,

    /// ISO timestamps; only the leading `YYYY-MM-DD` is meaningful
    #[serde(rename = "od")]
    pub operating_dates: Vec<String>,

    #[serde(rename = "st")]
    pub stops: Vec<RouteStop>,
}

/// One call of a train at a station
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteStop {
    #[serde(rename = "id")]
    pub station_id: i64,

    #[serde(rename = "ord")]
    pub order: u32,

    #[serde(rename = "atm")]
    pub arrival_time: String,

    /// Days after the nominal start of the run, absent or 0 on the first day
    #[serde(rename = "ady", default)]
    pub arrival_day: Option<u32>,

    #[serde(rename = "apl", default)]
    pub arrival_platform: Option<String>,

    #[serde(rename = "atr", default)]
    pub arrival_track: Option<String>,

    #[serde(rename = "dtm")]
    pub departure_time: String,

    #[serde(rename = "ddy", default)]
    pub departure_day: Option<u32>,

    #[serde(rename = "dpl", default)]
    pub departure_platform: Option<String>,

    #[serde(rename = "dtr", default)]
    pub departure_track: Option<String>,
}

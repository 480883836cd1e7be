//! Category-neutral output model.
//!
//! Each successfully decoded record freezes into exactly one [`Report`].
//! Every leaf field is optional: a field is only populated when the matching
//! data item was present on the wire (and survived its store predicate).
//! Sub-presence flags such as "garbled" or "code confidence attached" live
//! inside the value structs.
//!
//! All physical quantities are converted at the item level:
//! metres, metres/second, radians and seconds. Altitudes additionally keep
//! their value in feet, which is the unit the downstream consumers ask for.

use serde::Serialize;

/// Calendar date supplied by the framing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Context stamped onto every report by the record dispatcher.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub category: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_date: Option<FrameDate>,
    /// Time of recording in seconds since midnight UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u16>,
}

/// SAC/SIC pair, with the category 001 inheritance marker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataSourceIdentifier {
    pub sac: u8,
    pub sic: u8,
    /// True when the value was inherited from an earlier record of the same
    /// data block rather than carried by this record.
    pub supplemented: bool,
}

impl DataSourceIdentifier {
    pub fn new(sac: u8, sic: u8) -> Self {
        DataSourceIdentifier { sac, sic, supplemented: false }
    }

    pub fn value(&self) -> u16 {
        ((self.sac as u16) << 8) | self.sic as u16
    }
}

/// How the target was seen by the sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionType {
    pub is_radar_track: bool,
    pub simulated: bool,
    pub reported_from_psr: bool,
    pub reported_from_ssr: bool,
    pub reported_from_mds: bool,
    pub mode_s_all_call: bool,
    pub mode_s_roll_call: bool,
    pub test_target: bool,
    pub from_fixed_field_transponder: bool,
    /// EADS MSSR 2000 I extension carried as WEC 100.
    pub is_raw_plot: bool,
}

/// An SSR mode 1, 2 or 3/A code with its qualifier bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SsrCode {
    pub code: u16,
    pub garbled: bool,
    pub invalid: bool,
    pub smoothed: bool,
    /// Category 030: code changed since the last report.
    pub changed: bool,
    /// Confidence bits, not inverted (0 = high confidence). Attached only
    /// when the code itself was stored first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u16>,
}

/// Mode C height in 25 ft quantisation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ModeCHeight {
    /// Metres.
    pub value: f64,
    pub value_in_feet: i32,
    pub garbled: bool,
    pub invalid: bool,
    pub in_25_feet: bool,
}

/// Mode C code in Gray notation, as received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrayModeCCode {
    pub code: u16,
    pub garbled: bool,
    pub invalid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u16>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Height3D {
    /// Metres.
    pub value: f64,
    pub value_in_feet: i32,
    pub valid: bool,
}

/// Polar measured position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MeasuredPosition {
    /// Slant range in metres.
    pub range: f64,
    /// Azimuth in radians.
    pub azimuth: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CartesianPosition {
    /// Metres.
    pub x: f64,
    /// Metres.
    pub y: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct GroundVector {
    /// Ground speed in metres/second.
    pub speed: f64,
    /// Heading in radians.
    pub heading: f64,
}

/// Calculated Doppler speed (I048/120 subfield #1).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalculatedDopplerSpeed {
    /// Metres/second.
    pub value: i16,
    pub doubtful: bool,
}

/// Raw Doppler speed (I048/120 subfield #2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawDopplerSpeed {
    /// Metres/second.
    pub value: i16,
    /// Metres/second.
    pub ambiguity_range: u16,
    /// MHz.
    pub transmitter_frequency: u16,
}

/// Track status bits reported with category 001 track records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportedTrackStatus {
    pub confirmed: bool,
    pub primary_track: bool,
    pub secondary_track: bool,
    pub horizontal_manoeuvre: bool,
    pub doubtful_association: bool,
    pub ghost: bool,
    pub track_end: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XPulses {
    pub mode_2: bool,
    pub mode_3a: bool,
    pub mode_c: bool,
}

/// Capability and flight-status flags of I048/230.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeSFlags {
    pub communications_capability: u8,
    pub flight_status: u8,
    pub specific_service_capability: bool,
    /// Altitude reporting capability: true for 25 ft.
    pub altitude_reporting_25ft: bool,
    pub aircraft_identification_capability: bool,
    pub bds10_bit16: u8,
    pub bds10_bits37_40: u8,
    /// SI/II transponder capability, decoded with edition 1.16 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub si_capable: Option<bool>,
}

/// Selected altitude extracted from a BDS 4,0 register in I048/250.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedAltitude {
    /// Feet.
    pub value_in_feet: i32,
    /// 1 = target altitude source, 2 = MCP/FCU, 3 = FMS.
    pub source: u8,
    pub vnav: bool,
    pub alt_hold: bool,
    pub approach: bool,
}

/// One Mode S Comm-B register from I048/250. The register address sits in
/// the eighth octet, two BDS nibbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BdsRegister {
    pub bds: u8,
    pub data: [u8; 7],
}

impl BdsRegister {
    pub fn bds1(&self) -> u8 {
        (self.bds >> 4) & 0x0f
    }

    pub fn bds2(&self) -> u8 {
        self.bds & 0x0f
    }
}

/// Monoradar target report (categories 001 and 048).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Plot {
    #[serde(flatten)]
    pub header: ReportHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_type: Option<DetectionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antenna_number: Option<u8>,
    pub special_position_indication: bool,
    pub from_rdp_chain_1: bool,
    pub from_rdp_chain_2: bool,
    pub emergency_1: bool,
    pub emergency_2: bool,
    pub emergency_3: bool,
    pub military_emergency: bool,
    pub military_ident: bool,
    pub to_be_cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_position: Option<MeasuredPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_position: Option<CartesianPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_1: Option<SsrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_2: Option<SsrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_3a: Option<SsrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_4: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_c_height: Option<ModeCHeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_c_code: Option<GrayModeCCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_3d: Option<Height3D>,
    /// Category 001 measured radial Doppler speed, metres/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radial_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_doppler_speed: Option<CalculatedDopplerSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_doppler_speed: Option<RawDopplerSpeed>,
    /// dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_power: Option<i16>,
    /// Seconds since midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_time: Option<f64>,
    /// Raw truncated time of day (1/128 s units) as received in I001/141.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_time_of_day: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_vector: Option<GroundVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_status: Option<ReportedTrackStatus>,
    /// Raw track quality octets of I001/210, first two assembled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_quality: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wec_list: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_pulses: Option<XPulses>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_identification: Option<String>,
    /// 24-bit Mode S address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_address: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_s_flags: Option<ModeSFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_airborne: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_alert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_on_ground: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_spi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_altitude: Option<SelectedAltitude>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bds_registers: Vec<BdsRegister>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acas_ra_report: Option<[u8; 7]>,
    /// SSR plot runlength, degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_runlength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_replies: Option<u8>,
    /// dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_amplitude: Option<i16>,
    /// Primary plot runlength, degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_runlength: Option<f64>,
    /// dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_amplitude: Option<i16>,
    /// PSR-SSR range difference, metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_difference: Option<f64>,
    /// PSR-SSR azimuth difference, radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azimuth_difference: Option<f64>,
}

/// Status flags of an ARTAS system track (I030/080).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemTrackStatus {
    pub simulated: bool,
    pub tentative: bool,
    pub aircraft_derived_data: bool,
    pub coasted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_sensor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_by_psr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_by_ssr: Option<bool>,
    pub terminated: bool,
    pub created: bool,
    /// 0 = triangulated, 1 = derived from coverage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_reliable_height: Option<u8>,
    pub formation_flight: bool,
    pub amalgamated: bool,
    pub special_position_indication: bool,
    pub military_emergency: bool,
    pub transponder_delay_correction: bool,
    /// 0 = 1/64 NM position coding, 1 = 1/32 NM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_coding_precision: Option<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct TrackAltitude {
    /// Metres.
    pub value: f64,
    /// 0 = 3D height, 1 = triangulated, 2 = derived from coverage,
    /// 3 = assumed height.
    pub source: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct FlightLevel {
    /// Metres.
    pub value: f64,
    pub value_in_feet: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeOfFlight {
    /// 0 constant course, 1 right turn, 2 left turn, 3 undetermined.
    pub transversal: u8,
    /// 0 constant, 1 increasing, 2 decreasing groundspeed, 3 undetermined.
    pub longitudinal: u8,
    /// 0 level, 1 climb, 2 descent, 3 undetermined.
    pub vertical: u8,
}

/// Last measured values carried along a system track.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MeasuredInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<MeasuredPosition>,
    /// Measured 3D height, feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_3d_feet: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_mode_3a: Option<SsrCode>,
    /// Last mode C, feet, with qualifier bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_mode_c_feet: Option<i32>,
    pub last_mode_c_garbled: bool,
    pub last_mode_c_invalid: bool,
}

impl MeasuredInformation {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.height_3d_feet.is_none()
            && self.last_mode_3a.is_none()
            && self.last_mode_c_feet.is_none()
    }
}

/// ARTAS unit / track number pair of I030/050 and I032/050.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtasTrackNumber {
    pub unit: u16,
    pub number: u16,
    /// First entry of a chain is the master track.
    pub master: bool,
}

/// One departure/arrival time of I032/500 subfield #4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepartureArrivalTime {
    pub kind: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Supplementary flight data of I032/500.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SupplementaryFlightData {
    /// IFPS flight id: (type, number).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifps_flight_id: Option<(u8, u32)>,
    /// RVSM status bits and flight priority bit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rvsm_flight_priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_designation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<DepartureArrivalTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_stand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stand_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_instrument_departure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_instrument_arrival: Option<String>,
}

/// System track message (categories 030 and 032).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Track {
    #[serde(flatten)]
    pub header: ReportHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_identification: Option<u8>,
    /// Message family and nature (I032/035).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<(u8, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_message: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_last_update: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u16>,
    /// Only reported with the legacy 12-bit track number encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_numbering_indicator: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artas_track_numbers: Vec<ArtasTrackNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_status: Option<SystemTrackStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_2: Option<SsrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_3a: Option<SsrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_position: Option<CartesianPosition>,
    /// Standard deviations in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_position_accuracy: Option<CartesianPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_altitude: Option<TrackAltitude>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_altitude_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_mode_c_height: Option<FlightLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_flight_level: Option<FlightLevel>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_flight_level_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_vector: Option<GroundVector>,
    /// Speed accuracy in metres/second, heading accuracy in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_vector_accuracy: Option<GroundVector>,
    /// Metres/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cartesian_velocity: Option<CartesianPosition>,
    /// Metres/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cartesian_velocity_accuracy: Option<CartesianPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_of_flight: Option<ModeOfFlight>,
    /// Probabilities in per cent, same order as the mode of flight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_of_flight_probabilities: Option<(f64, f64, f64)>,
    /// Metres/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_climb_descent: Option<f64>,
    /// Metres/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_climb_descent_accuracy: Option<f64>,
    /// Degrees/second, positive clockwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_turn: Option<f64>,
    /// Degrees/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_turn_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updating_sensor: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_track_number: Option<u16>,
    /// Ages in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_3a_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_c_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_mode_3a_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_mode_c_age: Option<f64>,
    #[serde(skip_serializing_if = "MeasuredInformation::is_empty")]
    pub measured: MeasuredInformation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_address: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_identification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communications_capability: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fpps_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_plan_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_category: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_aircraft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_turbulence_category: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_ssr_codes: Option<Vec<u16>>,
    /// Feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_flight_level_feet: Option<i32>,
    /// Centre and position identification codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_position: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplementary: Option<SupplementaryFlightData>,
}

/// What a radar service message announces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    #[default]
    Undefined,
    NorthMarker,
    SectorCrossing,
    SouthMarker,
    FilteringZone,
    Supervisory,
    Server,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CollimationError {
    /// Metres.
    pub range: f64,
    /// Radians.
    pub azimuth: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PolarWindow {
    /// Metres.
    pub range_start: f64,
    pub range_stop: f64,
    /// Radians.
    pub azimuth_start: f64,
    pub azimuth_stop: f64,
}

/// One radar of the I000/040 configuration list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RadarConfiguration {
    pub sac: u8,
    pub sic: u8,
    pub status: u8,
}

/// One plot count of I002/070.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlotCount {
    pub aerial: u8,
    /// 1 = PSR, 2 = SSR, 3 = combined.
    pub ident: u8,
    pub counter: u16,
}

/// One service related report of I252/330.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub nature: u8,
    pub code: u16,
}

/// Radar service message (categories 000, 002 and 252).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ServiceMessage {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub kind: ServiceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceIdentifier>,
    /// Radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antenna_azimuth: Option<f64>,
    /// Radians/second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antenna_rotation_speed: Option<f64>,
    /// Seconds since midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_time: Option<f64>,
    /// Raw 1/128 s time of day as received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<u32>,
    pub activate_filtering_zone: bool,
    pub deactivate_filtering_zone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_configuration: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_processing_mode: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_error_conditions: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collimation_error: Option<CollimationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polar_window: Option<PolarWindow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plot_counts: Vec<PlotCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radar_configuration: Option<Vec<RadarConfiguration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_number: Option<u16>,
    /// Message family and nature (I252/035).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<(u8, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_identification: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_reports: Vec<ServiceReport>,
}

/// Sensor status message (category 063).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SensorStatus {
    #[serde(flatten)]
    pub header: ReportHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_identification: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<u16>,
    /// 0 operational, 1 degraded, 2 initialization, 3 not connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<u8>,
    /// Seconds since midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_time: Option<f64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_stamping_bias: Option<f64>,
    /// Dimensionless gain (wire LSB 1e-5) and bias in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_range_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_range_bias: Option<f64>,
    /// Radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_azimuth_bias: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_range_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_range_bias: Option<f64>,
    /// Radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psr_azimuth_bias: Option<f64>,
}

/// WGS-84 position of a predicted conflict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ConflictPositionWgs84 {
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Feet.
    pub altitude_feet: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ConflictPositionCartesian {
    /// Metres.
    pub x: f64,
    /// Metres.
    pub y: f64,
    /// Feet.
    pub z_feet: i32,
}

/// Per-aircraft block of I004/170 and I004/171.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AlertAircraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_3a: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_position_wgs84: Option<ConflictPositionWgs84>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_position_cartesian: Option<ConflictPositionCartesian>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_threshold: Option<f64>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_threshold: Option<f64>,
    /// First and, when extended, second characteristics octet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<(u8, Option<u8>)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_s_identifier: Option<[u8; 6]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_plan_number: Option<u32>,
    /// Feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_flight_level_feet: Option<i32>,
}

impl AlertAircraft {
    pub fn is_empty(&self) -> bool {
        self == &AlertAircraft::default()
    }
}

/// Timing and separation of I004/070.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ConflictTiming {
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_conflict: Option<f64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_closest_approach: Option<f64>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_horizontal_separation: Option<f64>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_horizontal_separation: Option<f64>,
    /// Feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_vertical_separation_feet: Option<i32>,
    /// Feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_vertical_separation_feet: Option<i32>,
}

/// Conflict characteristics of I004/120.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ConflictCharacteristics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nature: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<u8>,
    /// Per cent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Area names of I004/100.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AreaDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossing_area_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_taxiway_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_taxiway_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_bar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
}

/// Safety net alert message (category 004).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SafetyNetAlert {
    #[serde(flatten)]
    pub header: ReportHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sdps_identifiers: Vec<(u8, u8)>,
    /// Seconds since midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_identifier: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number_1: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number_2: Option<u16>,
    /// Raw octets of the safety net function status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_status: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_timing: Option<ConflictTiming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_characteristics: Option<ConflictCharacteristics>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitudinal_deviation: Option<f64>,
    /// Metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transversal_deviation: Option<f64>,
    /// Feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_deviation_feet: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_definition: Option<AreaDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fdps_sectors: Vec<(u8, u8)>,
    #[serde(skip_serializing_if = "AlertAircraft::is_empty")]
    pub aircraft_1: AlertAircraft,
    #[serde(skip_serializing_if = "AlertAircraft::is_empty")]
    pub aircraft_2: AlertAircraft,
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Plot(Plot),
    Track(Track),
    Service(ServiceMessage),
    SensorStatus(SensorStatus),
    SafetyNet(SafetyNetAlert),
}

impl Report {
    pub fn header(&self) -> &ReportHeader {
        match self {
            Report::Plot(r) => &r.header,
            Report::Track(r) => &r.header,
            Report::Service(r) => &r.header,
            Report::SensorStatus(r) => &r.header,
            Report::SafetyNet(r) => &r.header,
        }
    }
}

use crate::error::{SimError, SimResult};
use serde::Serialize;

/// Sim time while no simulation is active.
pub const IDLE_TIME: i32 = 0;
/// Every model initialisation event carries this time tag.
pub const INIT_TIME: i32 = 1;
/// Simulated seconds processed per engine cycle during time-lapse.
pub const TIME_LAPSE_EXE_CNT: u32 = 1000;
/// Time when realtime simulation starts.
pub const REALTIME_EPOCH: i32 = 10_000;
/// Marker time that ends a simulation. Unused scenario slots carry it too.
pub const REALTIME_END: i32 = 20_000;

/// Reserved link value meaning "no entry".
pub const EVT_CMD_NULL_IDX: u16 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubsystemId {
    Undef = 0,
    Sim = 1,
    Adcs = 2,
    Cdh = 3,
    Comm = 4,
    Fsw = 5,
    Instr = 6,
    Power = 7,
    Therm = 8,
}

impl SubsystemId {
    pub fn name(self) -> &'static str {
        match self {
            SubsystemId::Undef => "UNDEF",
            SubsystemId::Sim => "SIM",
            SubsystemId::Adcs => "ADCS",
            SubsystemId::Cdh => "CDH",
            SubsystemId::Comm => "COMM",
            SubsystemId::Fsw => "FSW",
            SubsystemId::Instr => "INSTR",
            SubsystemId::Power => "POWER",
            SubsystemId::Therm => "THERM",
        }
    }
}

/// Events owned by the simulation itself rather than a spacecraft model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Undef = 0,
    Idle = 1,
    StopSim = 2,
}

impl SimEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(SimEvent::Undef),
            1 => Some(SimEvent::Idle),
            2 => Some(SimEvent::StopSim),
            _ => None,
        }
    }
}

/// How an event's parameter text is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Undef = 0,
    OneInt = 1,
    TwoInt = 2,
    ThreeInt = 3,
    OneFlt = 4,
    ThreeFlt = 5,
    FourFlt = 6,
    None = 7,
}

impl ParamKind {
    pub fn field_count(self) -> usize {
        match self {
            ParamKind::Undef | ParamKind::None => 0,
            ParamKind::OneInt | ParamKind::OneFlt => 1,
            ParamKind::TwoInt => 2,
            ParamKind::ThreeInt | ParamKind::ThreeFlt => 3,
            ParamKind::FourFlt => 4,
        }
    }

    /// Strict check of `text` against this kind.
    ///
    /// Dispatch never calls this; it decodes leniently. Scenario activation
    /// uses it to flag entries that would silently leave scratch fields stale.
    pub fn validate(self, text: Option<&str>) -> SimResult<()> {
        let expected = self.field_count();
        let malformed = || SimError::MalformedParam {
            kind: self,
            text: text.unwrap_or_default().to_owned(),
        };

        if expected == 0 {
            return match text.map(str::trim) {
                Some(t) if !t.is_empty() => Err(malformed()),
                _ => Ok(()),
            };
        }

        let text = text.ok_or_else(malformed)?;
        let mut scratch = EventCmdParam::default();
        let mut scanner = Scanner::new(text);
        let loaded = scratch.load_from(self, &mut scanner);
        if loaded == expected && scanner.rest().trim().is_empty() {
            Ok(())
        } else {
            Err(malformed())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub prev: u16,
    pub next: u16,
}

impl Link {
    pub const NULL: Link = Link {
        prev: EVT_CMD_NULL_IDX,
        next: EVT_CMD_NULL_IDX,
    };
}

/// A timestamped instruction for one subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventCmd {
    pub link: Link,
    pub time: i32,
    pub subsystem: SubsystemId,
    pub id: u8,
    pub kind: ParamKind,
    pub param: Option<&'static str>,
}

impl EventCmd {
    pub const fn new(
        time: i32,
        subsystem: SubsystemId,
        id: u8,
        kind: ParamKind,
        param: Option<&'static str>,
    ) -> Self {
        Self {
            link: Link::NULL,
            time,
            subsystem,
            id,
            kind,
            param,
        }
    }

    /// Placeholder a model reports before it has processed anything.
    pub const fn idle(subsystem: SubsystemId) -> Self {
        Self::new(IDLE_TIME, subsystem, 0, ParamKind::None, None)
    }
}

/// Cursor target while the engine is idle.
pub const SIM_IDLE_CMD: EventCmd = EventCmd::new(
    IDLE_TIME,
    SubsystemId::Sim,
    SimEvent::Idle as u8,
    ParamKind::None,
    None,
);

/// Shared scratch for the parameters of the event being dispatched.
///
/// Overwritten on every dispatch. A decode that runs out of matching text
/// leaves the remaining fields holding whatever the previous event put there.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventCmdParam {
    pub one_int: i32,
    pub two_int: [i32; 2],
    pub three_int: [i32; 3],
    pub one_flt: f32,
    pub three_flt: [f32; 3],
    pub four_flt: [f32; 4],
}

impl EventCmdParam {
    /// Decode `text` as `kind`, returning the number of fields assigned.
    pub fn load(&mut self, kind: ParamKind, text: Option<&str>) -> usize {
        match text {
            Some(text) => self.load_from(kind, &mut Scanner::new(text)),
            None => 0,
        }
    }

    fn load_from(&mut self, kind: ParamKind, scanner: &mut Scanner<'_>) -> usize {
        match kind {
            ParamKind::OneInt => scan_ints(scanner, core::slice::from_mut(&mut self.one_int)),
            ParamKind::TwoInt => scan_ints(scanner, &mut self.two_int),
            ParamKind::ThreeInt => scan_ints(scanner, &mut self.three_int),
            ParamKind::OneFlt => match scanner.next_float() {
                Some(value) => {
                    self.one_flt = value as f32;
                    1
                }
                None => 0,
            },
            ParamKind::ThreeFlt => scan_floats(scanner, &mut self.three_flt),
            ParamKind::FourFlt => scan_floats(scanner, &mut self.four_flt),
            ParamKind::Undef | ParamKind::None => 0,
        }
    }
}

fn scan_ints(scanner: &mut Scanner<'_>, dest: &mut [i32]) -> usize {
    let mut loaded = 0;
    for slot in dest.iter_mut() {
        match scanner.next_int() {
            Some(value) => {
                *slot = value;
                loaded += 1;
            }
            None => break,
        }
    }
    loaded
}

fn scan_floats(scanner: &mut Scanner<'_>, dest: &mut [f32]) -> usize {
    let mut loaded = 0;
    for slot in dest.iter_mut() {
        match scanner.next_float() {
            Some(value) => {
                *slot = value as f32;
                loaded += 1;
            }
            None => break,
        }
    }
    loaded
}

/// Whitespace separated numeric tokenizer with C `%i` / `%f` conventions.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn rest(&self) -> &'a str {
        self.rest
    }

    /// `%i`: optional sign, then `0x` hex, leading-zero octal or decimal.
    fn next_int(&mut self) -> Option<i32> {
        let s = self.rest.trim_start();
        let bytes = s.as_bytes();
        let mut pos = 0;
        let negative = match bytes.first() {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };

        let radix = if bytes.get(pos) == Some(&b'0')
            && matches!(bytes.get(pos + 1), Some(b'x' | b'X'))
            && bytes.get(pos + 2).is_some_and(u8::is_ascii_hexdigit)
        {
            pos += 2;
            16
        } else if bytes.get(pos) == Some(&b'0') {
            8
        } else {
            10
        };

        let digits_start = pos;
        let mut value: i64 = 0;
        while let Some(digit) = bytes.get(pos).and_then(|b| char::from(*b).to_digit(radix)) {
            value = value.wrapping_mul(i64::from(radix)).wrapping_add(i64::from(digit));
            pos += 1;
        }
        if pos == digits_start {
            return None;
        }

        self.rest = &s[pos..];
        let value = if negative { value.wrapping_neg() } else { value };
        Some(value as i32)
    }

    /// `%f`: optional sign, digits with optional fraction, optional exponent.
    fn next_float(&mut self) -> Option<f64> {
        let s = self.rest.trim_start();
        let bytes = s.as_bytes();
        let mut pos = 0;
        if matches!(bytes.first(), Some(b'-' | b'+')) {
            pos += 1;
        }

        let mut mantissa_digits = 0;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
            mantissa_digits += 1;
        }
        if bytes.get(pos) == Some(&b'.') {
            pos += 1;
            while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
                mantissa_digits += 1;
            }
        }
        if mantissa_digits == 0 {
            return None;
        }

        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            let mut exp_pos = pos + 1;
            if matches!(bytes.get(exp_pos), Some(b'-' | b'+')) {
                exp_pos += 1;
            }
            if bytes.get(exp_pos).is_some_and(u8::is_ascii_digit) {
                while bytes.get(exp_pos).is_some_and(u8::is_ascii_digit) {
                    exp_pos += 1;
                }
                pos = exp_pos;
            }
        }

        let value = s[..pos].parse::<f64>().ok()?;
        self.rest = &s[pos..];
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_int_decode() {
        let mut param = EventCmdParam::default();
        assert_eq!(param.load(ParamKind::ThreeInt, Some("30 240 1")), 3);
        assert_eq!(param.three_int, [30, 240, 1]);
    }

    #[test]
    fn test_int_decode_follows_c_prefixes() {
        let mut param = EventCmdParam::default();
        param.load(ParamKind::OneInt, Some("0x1F"));
        assert_eq!(param.one_int, 31);
        param.load(ParamKind::OneInt, Some("010"));
        assert_eq!(param.one_int, 8);
        param.load(ParamKind::OneInt, Some("  -42"));
        assert_eq!(param.one_int, -42);
    }

    #[test]
    fn test_float_decode() {
        let mut param = EventCmdParam::default();
        assert_eq!(param.load(ParamKind::OneFlt, Some("50")), 1);
        assert!((param.one_flt - 50.0).abs() < f32::EPSILON);

        assert_eq!(param.load(ParamKind::FourFlt, Some("1.5 -2 3e2 .25")), 4);
        assert_eq!(param.four_flt, [1.5, -2.0, 300.0, 0.25]);
    }

    #[test]
    fn test_malformed_text_leaves_scratch_unchanged() {
        let mut param = EventCmdParam::default();
        param.load(ParamKind::ThreeInt, Some("7 8 9"));

        // Second token fails, so only the first field is overwritten
        assert_eq!(param.load(ParamKind::ThreeInt, Some("1 abc 3")), 1);
        assert_eq!(param.three_int, [1, 8, 9]);

        assert_eq!(param.load(ParamKind::OneInt, Some("xyz")), 0);
        assert_eq!(param.one_int, 0);
    }

    #[test]
    fn test_none_kind_performs_no_decode() {
        let mut param = EventCmdParam::default();
        param.load(ParamKind::OneInt, Some("5"));
        assert_eq!(param.load(ParamKind::None, Some("9")), 0);
        assert_eq!(param.load(ParamKind::OneInt, None), 0);
        assert_eq!(param.one_int, 5);
    }

    #[test]
    fn test_strict_validation() {
        assert!(ParamKind::ThreeInt.validate(Some("30 240 1")).is_ok());
        assert!(ParamKind::ThreeInt.validate(Some("30 240")).is_err());
        assert!(ParamKind::OneInt.validate(Some("12 trailing")).is_err());
        assert!(ParamKind::OneInt.validate(None).is_err());
        assert!(ParamKind::None.validate(None).is_ok());
        assert!(ParamKind::None.validate(Some("1")).is_err());
    }

    #[test]
    fn test_extreme_integers_wrap_instead_of_failing() {
        let mut param = EventCmdParam::default();
        assert_eq!(param.load(ParamKind::OneInt, Some("-9223372036854775808")), 1);
        assert_eq!(param.one_int, 0);

        assert_eq!(param.load(ParamKind::OneInt, Some("-2147483648")), 1);
        assert_eq!(param.one_int, i32::MIN);

        assert_eq!(param.load(ParamKind::TwoInt, Some("99999999999999999999999999 -0x8000000000000000")), 2);

        assert!(ParamKind::OneInt.validate(Some("-9223372036854775808")).is_ok());
        assert!(ParamKind::ThreeInt.validate(Some("-9223372036854775808 1 2")).is_ok());
    }
}

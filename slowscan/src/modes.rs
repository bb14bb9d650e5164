//! Mode descriptors
//!
//! Timings from [N7CXI, "Proposal for SSTV Mode Specifications", 2000][1]
//! and the [VIS code registry][2].
//!
//! [1]: http://www.barberdsp.com/downloads/Dayton%20Paper.pdf
//! [2]: https://web.archive.org/web/20050306193820/http://www.tima.com/~djones/vis.txt

/// 7-bit mode identifier transmitted in the VIS header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VisCode(u8);

impl VisCode {
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        if value & 0x80 == 0 {
            Some(Self(value))
        }
        else {
            None
        }
    }

    #[inline]
    pub const fn new_unchecked(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn get_bit(&self, bit: u8) -> bool {
        assert!(bit < 7);
        (self.0 >> bit) & 1 != 0
    }

    /// Even-parity bit over the 7 code bits.
    #[inline]
    pub fn parity(&self) -> bool {
        self.0.count_ones() & 1 != 0
    }
}

/// Per-line transmission grammar, with the timings that distinguish the
/// modes of each family. All durations are milliseconds.
#[derive(Clone, Copy, Debug)]
pub enum Family {
    /// One luma scan per line.
    Grayscale {
        /// Scan duration of the whole line.
        scan_ms: f64,
    },
    /// Green, blue, red scans separated by short porch gaps.
    Martin {
        /// Scan duration of one color channel.
        scan_ms: f64,
        gap_ms: f64,
    },
    /// Red, green, blue scans with the sync pulse in front of red rather
    /// than at the top of the line.
    Scottie {
        /// Scan duration of one color channel, with the gap already
        /// subtracted from the nominal channel time.
        scan_ms: f64,
        gap_ms: f64,
        sync_ms: f64,
    },
    /// Luma plus one chroma channel per line, alternating R-Y and B-Y.
    Robot36 {
        y_scan_ms: f64,
        c_scan_ms: f64,
        /// Separator announcing which chroma follows.
        sep_ms: f64,
        porch_ms: f64,
        sync_ms: f64,
        sync_porch_ms: f64,
    },
    /// Two source lines per transmitted line, chroma averaged across the
    /// pair.
    Pd {
        porch_ms: f64,
        pixel_ms: f64,
    },
}

/// Immutable per-mode record: identity, geometry and timing.
///
/// `sync_ms` is the top-of-line sync pulse. It is zero for families that
/// embed their sync inside the line body (Scottie in front of the red
/// channel, Robot 36 in its own grammar), so the top-of-line pulse and
/// the embedded one can never both fire.
#[derive(Clone, Copy, Debug)]
pub struct Mode {
    pub name: &'static str,
    pub short_name: &'static str,
    pub vis_code: VisCode,
    pub width: usize,
    pub height: usize,
    pub sync_ms: f64,
    pub family: Family,
}

impl Mode {
    pub const R8BW: Self = Self {
        name: "Robot 8 B/W",
        short_name: "R8BW",
        vis_code: VisCode(0x02),
        width: 160,
        height: 120,
        sync_ms: 7.0,
        family: Family::Grayscale { scan_ms: 60.0 },
    };

    pub const R24BW: Self = Self {
        name: "Robot 24 B/W",
        short_name: "R24BW",
        vis_code: VisCode(0x0a),
        width: 320,
        height: 240,
        sync_ms: 7.0,
        family: Family::Grayscale { scan_ms: 93.0 },
    };

    pub const M1: Self = Self {
        name: "Martin M1",
        short_name: "M1",
        vis_code: VisCode(0x2c),
        width: 320,
        height: 256,
        sync_ms: 4.862,
        family: Family::Martin {
            scan_ms: 146.432,
            gap_ms: 0.572,
        },
    };

    pub const M2: Self = Self {
        name: "Martin M2",
        short_name: "M2",
        vis_code: VisCode(0x28),
        width: 160,
        height: 256,
        sync_ms: 4.862,
        family: Family::Martin {
            scan_ms: 73.216,
            gap_ms: 0.572,
        },
    };

    pub const S1: Self = Self {
        name: "Scottie S1",
        short_name: "S1",
        vis_code: VisCode(0x3c),
        width: 320,
        height: 256,
        sync_ms: 0.0,
        family: Family::Scottie {
            scan_ms: 136.74,
            gap_ms: 1.5,
            sync_ms: 9.0,
        },
    };

    pub const S2: Self = Self {
        name: "Scottie S2",
        short_name: "S2",
        vis_code: VisCode(0x38),
        width: 160,
        height: 256,
        sync_ms: 0.0,
        family: Family::Scottie {
            scan_ms: 86.564,
            gap_ms: 1.5,
            sync_ms: 9.0,
        },
    };

    pub const R36: Self = Self {
        name: "Robot 36",
        short_name: "R36",
        vis_code: VisCode(0x08),
        width: 320,
        height: 240,
        sync_ms: 0.0,
        family: Family::Robot36 {
            y_scan_ms: 88.0,
            c_scan_ms: 44.0,
            sep_ms: 4.5,
            porch_ms: 1.5,
            sync_ms: 9.0,
            sync_porch_ms: 3.0,
        },
    };

    pub const PD90: Self = Self {
        name: "PD-90",
        short_name: "PD90",
        vis_code: VisCode(0x63),
        width: 320,
        height: 256,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.532,
        },
    };

    pub const PD120: Self = Self {
        name: "PD-120",
        short_name: "PD120",
        vis_code: VisCode(0x5f),
        width: 640,
        height: 496,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.190,
        },
    };

    pub const PD160: Self = Self {
        name: "PD-160",
        short_name: "PD160",
        vis_code: VisCode(0x62),
        width: 512,
        height: 400,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.382,
        },
    };

    pub const PD180: Self = Self {
        name: "PD-180",
        short_name: "PD180",
        vis_code: VisCode(0x60),
        width: 640,
        height: 496,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.286,
        },
    };

    pub const PD240: Self = Self {
        name: "PD-240",
        short_name: "PD240",
        vis_code: VisCode(0x61),
        width: 640,
        height: 496,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.382,
        },
    };

    pub const PD290: Self = Self {
        name: "PD-290",
        short_name: "PD290",
        vis_code: VisCode(0x5e),
        width: 800,
        height: 616,
        sync_ms: 20.0,
        family: Family::Pd {
            porch_ms: 2.08,
            pixel_ms: 0.286,
        },
    };

    pub const ALL: &'static [Self] = &[
        Self::R8BW,
        Self::R24BW,
        Self::M1,
        Self::M2,
        Self::S1,
        Self::S2,
        Self::R36,
        Self::PD90,
        Self::PD120,
        Self::PD160,
        Self::PD180,
        Self::PD240,
        Self::PD290,
    ];

    /// Look a mode up by its full or short name, ignoring case and
    /// punctuation ("PD-120", "pd120" and "Pd 120" all match).
    pub fn by_name(name: &str) -> Option<&'static Self> {
        let needle = normalize(name);
        Self::ALL
            .iter()
            .find(|mode| normalize(mode.name) == needle || normalize(mode.short_name) == needle)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::modes::{
        Family,
        Mode,
        VisCode,
    };

    #[test]
    fn correct_vis_codes() {
        assert_eq!(Mode::R8BW.vis_code, VisCode(0x02));
        assert_eq!(Mode::R24BW.vis_code, VisCode(0x0a));
        assert_eq!(Mode::M1.vis_code, VisCode(0x2c));
        assert_eq!(Mode::M2.vis_code, VisCode(0x28));
        assert_eq!(Mode::S1.vis_code, VisCode(0x3c));
        assert_eq!(Mode::S2.vis_code, VisCode(0x38));
        assert_eq!(Mode::R36.vis_code, VisCode(0x08));
        assert_eq!(Mode::PD90.vis_code, VisCode(0x63));
        assert_eq!(Mode::PD120.vis_code, VisCode(0x5f));
        assert_eq!(Mode::PD160.vis_code, VisCode(0x62));
        assert_eq!(Mode::PD180.vis_code, VisCode(0x60));
        assert_eq!(Mode::PD240.vis_code, VisCode(0x61));
        assert_eq!(Mode::PD290.vis_code, VisCode(0x5e));
    }

    #[test]
    fn correct_geometry() {
        for (mode, width, height) in [
            (&Mode::R8BW, 160, 120),
            (&Mode::R24BW, 320, 240),
            (&Mode::M1, 320, 256),
            (&Mode::M2, 160, 256),
            (&Mode::S1, 320, 256),
            (&Mode::S2, 160, 256),
            (&Mode::R36, 320, 240),
            (&Mode::PD90, 320, 256),
            (&Mode::PD120, 640, 496),
            (&Mode::PD160, 512, 400),
            (&Mode::PD180, 640, 496),
            (&Mode::PD240, 640, 496),
            (&Mode::PD290, 800, 616),
        ] {
            assert_eq!(mode.width, width, "{}", mode.name);
            assert_eq!(mode.height, height, "{}", mode.name);
        }
    }

    #[test]
    fn parity_is_even() {
        // 0x2c has three bits set, 0x08 one, 0x3c four
        assert!(VisCode(0x2c).parity());
        assert!(VisCode(0x08).parity());
        assert!(!VisCode(0x3c).parity());
        assert!(!VisCode(0x00).parity());
    }

    #[test]
    fn vis_code_rejects_high_bit() {
        assert!(VisCode::new(0x7f).is_some());
        assert!(VisCode::new(0x80).is_none());
    }

    #[test]
    fn by_name_ignores_case_and_punctuation() {
        assert!(matches!(
            Mode::by_name("pd-120").unwrap().family,
            Family::Pd { .. }
        ));
        assert_eq!(Mode::by_name("Martin M1").unwrap().short_name, "M1");
        assert_eq!(Mode::by_name("m1").unwrap().short_name, "M1");
        assert_eq!(Mode::by_name("robot 36").unwrap().short_name, "R36");
        assert_eq!(Mode::by_name("ROBOT8BW").unwrap().short_name, "R8BW");
        assert!(Mode::by_name("AVT 90").is_none());
    }

    #[test]
    fn embedded_sync_modes_have_no_line_sync() {
        for mode in [&Mode::S1, &Mode::S2, &Mode::R36] {
            assert_eq!(mode.sync_ms, 0.0, "{}", mode.name);
        }
    }
}

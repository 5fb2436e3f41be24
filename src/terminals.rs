// Port Schedule Monitor - Terminal Name Resolver
// Static lookup of Busan New Port berth codes and terminal info sites

use serde::Serialize;

// ============================================================================
// BERTH CODES
// ============================================================================

/// Berth code → display name
const TERMINAL_NAMES: [(&str, &str); 28] = [
    ("NT01", "PNIT 1번"),
    ("NT02", "PNIT 2번"),
    ("NT03", "PNIT 3번"),
    ("NT04", "PNC 4번"),
    ("NT05", "PNC 5번"),
    ("NT06", "PNC 6번"),
    ("NT07", "PNC 7번"),
    ("NT08", "PNC 8번"),
    ("NT09", "PNC 미확정"),
    ("NT10(HJ1)", "한진 1번"),
    ("NT11(HJ2)", "한진 2번"),
    ("NT12(HJ3)", "한진 3번"),
    ("NT13(HJ4)", "한진 4번"),
    ("WT01", "동원 1번"),
    ("WT02", "동원 2번"),
    ("WT03", "동원 3번"),
    ("MT-1", "다목적 북측"),
    ("ST01", "현대 1번"),
    ("ST02", "현대 2번"),
    ("ST03", "현대 3번"),
    ("ST04", "현대 4번"),
    ("ST05", "고려 1번"),
    ("ST06", "고려 2번"),
    ("ST07", "고려 3번"),
    ("ST08", "고려 4번"),
    ("ST09", "BCT 1번"),
    ("ST10", "BCT 2번"),
    ("ST11", "BCT 3번"),
];

/// Resolve a berth code to its display name.
///
/// Unknown codes (including the empty string) come back unchanged.
pub fn terminal_name(code: &str) -> &str {
    TERMINAL_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// All known berth codes with their display names, in table order
pub fn terminal_table() -> &'static [(&'static str, &'static str)] {
    &TERMINAL_NAMES
}

// ============================================================================
// TERMINAL INFO SITES
// ============================================================================

/// External terminal information website
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalLink {
    pub name: &'static str,
    pub url: &'static str,
}

pub const TERMINAL_LINKS: [TerminalLink; 8] = [
    TerminalLink { name: "PNIT", url: "https://www.pnitl.com/infoservice/vessel/vslScheduleChart.jsp" },
    TerminalLink { name: "PNC", url: "https://svc.pncport.com/info/CMS/Ship/ShipBerthCNew.pnc?mCode=MN105" },
    TerminalLink { name: "HJNC", url: "https://www.hjnc.co.kr/esvc/vessel/berthScheduleG" },
    TerminalLink { name: "HPNT", url: "https://www.hpnt.co.kr/infoservice/vessel/vslScheduleChart.jsp" },
    TerminalLink { name: "BNCT", url: "https://info.bnctkorea.com/esvc/vessel/berthScheduleG" },
    TerminalLink { name: "BCT", url: "https://info.bct2-4.com/infoservice/index.html" },
    TerminalLink { name: "DGT", url: "https://info.dgtbusan.com/DGT/esvc/vessel/berthScheduleG" },
    TerminalLink { name: "신항AIS", url: "https://www.marinetraffic.com/en/ais/home/centerx:128.788/centery:35.056/zoom:13" },
];

/// Terminal schedule sites (everything except the AIS map)
pub fn terminal_sites() -> &'static [TerminalLink] {
    &TERMINAL_LINKS[..7]
}

/// The live AIS map, shown apart from the terminal sites in the header
pub fn ais_link() -> &'static TerminalLink {
    &TERMINAL_LINKS[7]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_resolves() {
        assert_eq!(terminal_name("NT01"), "PNIT 1번");
        assert_eq!(terminal_name("NT10(HJ1)"), "한진 1번");
        assert_eq!(terminal_name("MT-1"), "다목적 북측");
        assert_eq!(terminal_name("ST11"), "BCT 3번");
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(terminal_name("OUTER"), "OUTER");
        assert_eq!(terminal_name("nt01"), "nt01");
        assert_eq!(terminal_name(""), "");
    }

    #[test]
    fn test_table_codes_are_unique() {
        let mut codes: Vec<&str> = terminal_table().iter().map(|(code, _)| *code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 28);
    }

    #[test]
    fn test_links_split() {
        assert_eq!(terminal_sites().len(), 7);
        assert!(terminal_sites().iter().all(|link| link.name != "신항AIS"));
        assert_eq!(ais_link().name, "신항AIS");
    }
}

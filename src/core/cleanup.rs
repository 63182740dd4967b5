//! 後端輸出的確定性清理。
//!
//! 只修正已知的表面偏差（宣告、根元素、命名空間屬性、markdown 區塊、時間格式、EVERY_DAY 別名），
//! 不做結構驗證。`cleanup(cleanup(x)) == cleanup(x)`。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\?xml[^>]*\?>").unwrap());

static ROOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?(?:[A-Za-z_][\w.-]*:)?PropertiesWithSchedule\b[^>]*>").unwrap()
});

static NAMESPACE_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+xmlns(?::[\w.-]+)?\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap()
});

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<(?P<open>(?:[A-Za-z_][\w.-]*:)?(?:startTime|endTime))>\s*(?P<hh>\d{2})(?P<mm>\d{2})\s*</(?P<close>(?:[A-Za-z_][\w.-]*:)?(?:startTime|endTime))>",
    )
    .unwrap()
});

static EVERY_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<(?P<open>(?:[A-Za-z_][\w.-]*:)?day)>\s*EVERY_DAY\s*</(?P<close>(?:[A-Za-z_][\w.-]*:)?day)>",
    )
    .unwrap()
});

static INTERVAL_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?timeInterval(?:\s[^>]*)?>").unwrap());
static INTERVAL_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</(?:[A-Za-z_][\w.-]*:)?timeInterval\s*>").unwrap());
static TIMESHEET_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?Timesheet(?:\s[^>]*)?>").unwrap());
static TIMESHEET_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</(?:[A-Za-z_][\w.-]*:)?Timesheet\s*>").unwrap());
static NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bxmlns(?::[\w.-]+)?\s*=").unwrap());

/// 清理後端原始輸出
pub fn cleanup(raw: &str) -> String {
    // 移除包裝直到沒有變化，避免移除後又拼出新的包裝
    let mut current = raw.to_string();
    loop {
        let stripped = strip_wrappers(&current);
        if stripped == current {
            break;
        }
        current = stripped;
    }

    let trimmed = current.trim();
    let timed = normalize_times(trimmed);
    canonicalize_day_alias(&timed)
}

fn strip_wrappers(text: &str) -> String {
    let text = DECLARATION_RE.replace_all(text, "");
    let text = ROOT_RE.replace_all(&text, "");
    let text = NAMESPACE_ATTR_RE.replace_all(&text, "");
    FENCE_RE.replace_all(&text, "").into_owned()
}

/// `<startTime>0800</startTime>` -> `<startTime>08:00</startTime>`
pub fn normalize_times(text: &str) -> String {
    TIME_RE
        .replace_all(text, |caps: &Captures| {
            if caps["open"] != caps["close"] {
                return caps[0].to_string();
            }
            format!(
                "<{tag}>{}:{}</{tag}>",
                &caps["hh"],
                &caps["mm"],
                tag = &caps["open"]
            )
        })
        .into_owned()
}

/// 舊版合約使用 EVERY_DAY，統一成 ANY
pub fn canonicalize_day_alias(text: &str) -> String {
    EVERY_DAY_RE
        .replace_all(text, |caps: &Captures| {
            if caps["open"] != caps["close"] {
                return caps[0].to_string();
            }
            format!("<{tag}>ANY</{tag}>", tag = &caps["open"])
        })
        .into_owned()
}

/// 清理後片段的形狀摘要，只用於記錄與測試，不會拒絕輸出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentReport {
    pub intervals: usize,
    pub balanced: bool,
    pub has_declaration: bool,
    pub has_namespace: bool,
    pub has_root: bool,
}

impl FragmentReport {
    pub fn is_conformant(&self) -> bool {
        self.balanced && !self.has_declaration && !self.has_namespace && !self.has_root
    }
}

pub fn inspect_fragment(xml: &str) -> FragmentReport {
    let intervals = INTERVAL_OPEN_RE.find_iter(xml).count();
    let interval_closes = INTERVAL_CLOSE_RE.find_iter(xml).count();
    let sheets = TIMESHEET_OPEN_RE.find_iter(xml).count();
    let sheet_closes = TIMESHEET_CLOSE_RE.find_iter(xml).count();

    FragmentReport {
        intervals,
        balanced: intervals == interval_closes && sheets == sheet_closes && sheets == intervals,
        has_declaration: DECLARATION_RE.is_match(xml),
        has_namespace: NAMESPACE_RE.is_match(xml),
        has_root: ROOT_RE.is_match(xml),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>WORK_DAY</aixm:day>
    <aixm:startTime>08:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>";

    fn sheet_with(day: &str, start: &str, end: &str) -> String {
        SHEET
            .replace("WORK_DAY", day)
            .replace("08:00", start)
            .replace("18:00", end)
    }

    #[test]
    fn test_clean_input_is_unchanged() {
        assert_eq!(cleanup(SHEET), SHEET);
    }

    #[test]
    fn test_strips_declaration_root_and_fences() {
        let raw = format!(
            "```xml\n<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<aixm:PropertiesWithSchedule gml:id=\"p1\">\n{}\n</aixm:PropertiesWithSchedule>\n```\n",
            SHEET
        );
        assert_eq!(cleanup(&raw), SHEET);
    }

    #[test]
    fn test_strips_fence_without_language_tag() {
        let raw = format!("```\n{}\n```", SHEET);
        assert_eq!(cleanup(&raw), SHEET);
    }

    #[test]
    fn test_digit_pair_times_get_colon() {
        for day in ["WORK_DAY", "WEEKEND", "MON", "SAT", "ANY"] {
            let raw = sheet_with(day, "0700", "2145");
            let cleaned = cleanup(&raw);
            assert!(cleaned.contains("<aixm:startTime>07:00</aixm:startTime>"), "{day}");
            assert!(cleaned.contains("<aixm:endTime>21:45</aixm:endTime>"), "{day}");
        }
    }

    #[test]
    fn test_times_without_prefix_and_padding() {
        let raw = "<startTime> 0600 </startTime><endTime>2400</endTime>";
        assert_eq!(
            normalize_times(raw),
            "<startTime>06:00</startTime><endTime>24:00</endTime>"
        );
    }

    #[test]
    fn test_mismatched_time_tags_are_left_alone() {
        let raw = "<aixm:startTime>0600</aixm:endTime>";
        assert_eq!(normalize_times(raw), raw);
    }

    #[test]
    fn test_other_elements_keep_digits() {
        let raw = "<aixm:annotation>\n  <aixm:Note>PPR 0800</aixm:Note>\n</aixm:annotation>";
        assert_eq!(cleanup(raw), raw);
    }

    #[test]
    fn test_every_day_alias_becomes_any() {
        let raw = sheet_with("EVERY_DAY", "00:00", "24:00");
        let cleaned = cleanup(&raw);
        assert!(cleaned.contains("<aixm:day>ANY</aixm:day>"));
        assert!(!cleaned.contains("EVERY_DAY"));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let samples = [
            String::new(),
            "   ".to_string(),
            SHEET.to_string(),
            format!("```xml\n{}\n```", sheet_with("EVERY_DAY", "0000", "2400")),
            format!("<?xml version=\"1.0\"?>{}", SHEET),
            format!("<aixm:PropertiesWithSchedule>\n  {}\n</aixm:PropertiesWithSchedule>", SHEET),
            "<?x```ml version=\"1.0\"?>".to_string(),
            "``````xml".to_string(),
            "<a xmlns:b=\"u\"\n xmlns='v'>x</a>".to_string(),
            "Here is the XML:\n```xml\n<aixm:startTime>0800</aixm:startTime>\n```".to_string(),
        ];
        for raw in samples.iter() {
            let once = cleanup(raw);
            assert_eq!(cleanup(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_inspect_fragment() {
        let two = format!("{}\n{}", SHEET, SHEET);
        let report = inspect_fragment(&two);
        assert_eq!(report.intervals, 2);
        assert!(report.is_conformant());

        let truncated = &SHEET[..SHEET.len() - "</aixm:timeInterval>".len()];
        assert!(!inspect_fragment(truncated).balanced);

        let namespaced = SHEET.replace(
            "<aixm:timeInterval>",
            "<aixm:timeInterval xmlns:aixm=\"http://www.aixm.aero/schema/5.1.1\">",
        );
        let report = inspect_fragment(&namespaced);
        assert_eq!(report.intervals, 1);
        assert!(report.has_namespace);
        assert!(!report.is_conformant());
    }

    #[test]
    fn test_namespace_declarations_are_removed() {
        let raw = SHEET
            .replace(
                "<aixm:timeInterval>",
                "<aixm:timeInterval xmlns:aixm=\"http://www.aixm.aero/schema/5.1.1\" xmlns:gml='http://www.opengis.net/gml/3.2'>",
            )
            .replace("<aixm:Timesheet>", "<aixm:Timesheet xmlns = \"urn:default\">");
        let cleaned = cleanup(&raw);
        assert_eq!(cleaned, SHEET);
        assert!(!cleaned.contains("xmlns"));
        assert!(inspect_fragment(&cleaned).is_conformant());
        assert_eq!(cleanup(&cleaned), cleaned);
    }

    #[test]
    fn test_cleaned_output_has_no_wrappers() {
        let raw = format!(
            "<?xml version=\"1.0\"?>\n<PropertiesWithSchedule>{}</PropertiesWithSchedule>",
            SHEET
        );
        let report = inspect_fragment(&cleanup(&raw));
        assert!(!report.has_declaration);
        assert!(!report.has_root);
        assert_eq!(report.intervals, 1);
    }
}

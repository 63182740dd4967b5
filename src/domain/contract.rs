//! 正規化合約：交給生成後端的指令文字。
//!
//! 兩個版本：`Detailed`（完整規則 + 範例，給主要模型）與 `Minimal`（只有規則摘要，給備援模型）。
//! 範本在第一次使用時組好並快取，每次請求只插入使用者的排程文字。

use once_cell::sync::Lazy;

const SCHEDULE_PLACEHOLDER: &str = "{schedule_text}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationContract {
    Detailed,
    Minimal,
}

/// 合約中的一組輸入 / 輸出範例
#[derive(Debug, Clone, Copy)]
pub struct WorkedExample {
    pub title: &'static str,
    pub input: &'static str,
    pub output: &'static str,
}

impl NormalizationContract {
    pub fn version(&self) -> &'static str {
        match self {
            NormalizationContract::Detailed => "detailed-v2",
            NormalizationContract::Minimal => "minimal-v1",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            NormalizationContract::Detailed => DETAILED_TEMPLATE.as_str(),
            NormalizationContract::Minimal => MINIMAL_TEMPLATE,
        }
    }

    /// 將排程文字原樣插入範本
    pub fn render(&self, schedule_text: &str) -> String {
        self.template()
            .replacen(SCHEDULE_PLACEHOLDER, schedule_text, 1)
    }

    pub fn worked_examples(&self) -> &'static [WorkedExample] {
        match self {
            NormalizationContract::Detailed => WORKED_EXAMPLES,
            NormalizationContract::Minimal => &[],
        }
    }
}

static DETAILED_TEMPLATE: Lazy<String> = Lazy::new(|| {
    let mut template = String::from(DETAILED_RULES);
    template.push_str("\n## EXAMPLES\n");
    for (index, example) in WORKED_EXAMPLES.iter().enumerate() {
        template.push_str(&format!(
            "\nExample {}: {}\nInput: \"{}\"\nOutput:\n{}\n",
            index + 1,
            example.title,
            example.input,
            example.output
        ));
    }
    template.push_str("\nNow convert the following schedule to AIXM 5.1.1 XML format:\n");
    template.push_str(SCHEDULE_PLACEHOLDER);
    template.push('\n');
    template
});

const DETAILED_RULES: &str = r#"You are an expert aeronautical information specialist tasked with converting natural language schedule descriptions into standardized AIXM 5.1.1 XML format.

## CONVERSION TASK
Convert the provided aeronautical service schedule text into properly formatted AIXM 5.1.1 XML timeInterval elements.

## AIXM 5.1.1 STRUCTURE
Each distinct schedule period must be represented as a separate <aixm:timeInterval> element containing exactly one <aixm:Timesheet>.
Timesheet children must appear in this order, omitting the ones that do not apply:
- <aixm:timeReference>: Always "UTC"
- <aixm:startDate>: Beginning date in DD-MM format (e.g., "01-01" for January 1)
- <aixm:endDate>: Ending date in DD-MM format (e.g., "31-12" for December 31)
- <aixm:day>: Day specification (see standardized values below)
- <aixm:dayTil>: Optional last day when a single element must cover a day range
- <aixm:startTime>: Start time in 24-hour format with colon (e.g., "08:00")
- <aixm:endTime>: End time in 24-hour format with colon (e.g., "18:00")
- <aixm:excluded>: "YES" only for exclusion timesheets
- <aixm:annotation>: Supplementary free text in <aixm:Note>
Do not use startEvent, endEvent or relative time variants.

## DATE RULES
- Dates are DD-MM
- When no date range is given, or the schedule is year-round, use startDate "01-01" and endDate "31-12"

## STANDARDIZED DAY VALUES
- Use "WORK_DAY" for Monday through Friday (MON-FRI)
- Use "WEEKEND" for Saturday and Sunday (SAT-SUN)
- Use "ANY" for all days of the week (daily, every day, H24)
- Use individual day codes (MON, TUE, WED, THU, FRI, SAT, SUN) for specific days
- Use "HOL" for public holidays
- A day range that is not exactly MON-FRI, SAT-SUN or all days (e.g., MON-THU) must be expanded into one timeInterval per individual day

## TIME FORMAT RULES
- Always use 24-hour format with a colon separator (e.g., "08:00" not "0800")
- Convert any time without a colon (e.g., "0800") to the proper format ("08:00")
- For 24-hour or continuous service, use startTime "00:00" and endTime "24:00"
- When several time ranges apply to the same days, create one timeInterval per day and time range combination

## SEASONAL VARIATIONS
- Winter (WIN) spans NOV-MAR: startDate "01-11", endDate "31-03"
- Summer (SUM) spans APR-OCT: startDate "01-04", endDate "31-10"
- Daylight saving time markers (DST, summer time) use the summer boundaries; standard time markers use the winter boundaries
- Create separate timeInterval elements for each season and schedule combination

## HOLIDAYS AND EXCEPTIONS
- Exclusions are separate timesheets with <aixm:excluded>YES</aixm:excluded>
- "except holidays" / "HOL closed" excludes day "HOL"
- Excluded explicit dates use startDate/endDate for the excluded period and day "ANY"
- A full-day exclusion has no startTime and no endTime

## ANNOTATIONS
- Free text that cannot be expressed with the elements above is copied verbatim into <aixm:annotation><aixm:Note>
- If the input contains no days or times at all (e.g., "ATS SKED", "O/R"), output a single timesheet with timeReference, the default date range, day "ANY" and the annotation, without startTime and endTime

## OUTPUT REQUIREMENTS
- Do NOT include an XML declaration (<?xml version="1.0"?>)
- Do NOT include namespace declarations or root elements
- Do NOT include <aixm:PropertiesWithSchedule> elements
- Do NOT wrap the output in markdown code fences
- ONLY output the raw <aixm:timeInterval> elements
- Indent with exactly 2 spaces per nesting level
"#;

const WORKED_EXAMPLES: &[WorkedExample] = &[
    WorkedExample {
        title: "Basic weekday and Saturday schedule",
        input: "MON-FRI: 0800-1800, SAT: 0800-1200",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>WORK_DAY</aixm:day>
    <aixm:startTime>08:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>SAT</aixm:day>
    <aixm:startTime>08:00</aixm:startTime>
    <aixm:endTime>12:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
    WorkedExample {
        title: "24-hour service",
        input: "H24",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>ANY</aixm:day>
    <aixm:startTime>00:00</aixm:startTime>
    <aixm:endTime>24:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
    WorkedExample {
        title: "Day range with two time ranges",
        input: "MON-THU: 0700-1300, 1400-1800",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>MON</aixm:day>
    <aixm:startTime>07:00</aixm:startTime>
    <aixm:endTime>13:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>MON</aixm:day>
    <aixm:startTime>14:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>TUE</aixm:day>
    <aixm:startTime>07:00</aixm:startTime>
    <aixm:endTime>13:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>TUE</aixm:day>
    <aixm:startTime>14:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>WED</aixm:day>
    <aixm:startTime>07:00</aixm:startTime>
    <aixm:endTime>13:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>WED</aixm:day>
    <aixm:startTime>14:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>THU</aixm:day>
    <aixm:startTime>07:00</aixm:startTime>
    <aixm:endTime>13:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>THU</aixm:day>
    <aixm:startTime>14:00</aixm:startTime>
    <aixm:endTime>18:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
    WorkedExample {
        title: "Seasonal variation",
        input: "SUM: 0600-2145 / WIN: 0700-2100",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-04</aixm:startDate>
    <aixm:endDate>31-10</aixm:endDate>
    <aixm:day>ANY</aixm:day>
    <aixm:startTime>06:00</aixm:startTime>
    <aixm:endTime>21:45</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-11</aixm:startDate>
    <aixm:endDate>31-03</aixm:endDate>
    <aixm:day>ANY</aixm:day>
    <aixm:startTime>07:00</aixm:startTime>
    <aixm:endTime>21:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
    WorkedExample {
        title: "Holiday exclusion",
        input: "Daily: 0900-1700 except holidays",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>ANY</aixm:day>
    <aixm:startTime>09:00</aixm:startTime>
    <aixm:endTime>17:00</aixm:endTime>
  </aixm:Timesheet>
</aixm:timeInterval>
<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>HOL</aixm:day>
    <aixm:excluded>YES</aixm:excluded>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
    WorkedExample {
        title: "Annotation only",
        input: "ATS SKED",
        output: r#"<aixm:timeInterval>
  <aixm:Timesheet>
    <aixm:timeReference>UTC</aixm:timeReference>
    <aixm:startDate>01-01</aixm:startDate>
    <aixm:endDate>31-12</aixm:endDate>
    <aixm:day>ANY</aixm:day>
    <aixm:annotation>
      <aixm:Note>ATS SKED</aixm:Note>
    </aixm:annotation>
  </aixm:Timesheet>
</aixm:timeInterval>"#,
    },
];

const MINIMAL_TEMPLATE: &str = r#"You are an expert system that converts aeronautical service schedules from natural language text into structured AIXM 5.1.1 XML format.

In AIXM 5.1.1, service schedules are represented using timeInterval elements.
Each timeInterval contains exactly one Timesheet that defines a portion of the schedule.

A Timesheet includes, in this order:
- timeReference (always "UTC")
- startDate and endDate (in DD-MM format, default to 01-01 and 31-12 for year-round schedules; winter is 01-11 to 31-03, summer is 01-04 to 31-10)
- day (specific days like MON, TUE, etc., or WORK_DAY, WEEKEND, ANY, or HOL for holidays; expand other day ranges into one timeInterval per day)
- startTime and endTime (in HH:MM format with a colon, 00:00 to 24:00 for continuous service)
- excluded (YES for holiday or date exclusions, without times for full-day exclusions)
- annotation with a Note holding any free text that does not fit the fields above

Output only the raw timeInterval elements indented with 2 spaces per level: no XML declaration, no namespace declarations, no root element, no code fences.

Convert this schedule to AIXM 5.1.1 XML format: {schedule_text}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cleanup::{cleanup, inspect_fragment};

    fn example(input: &str) -> WorkedExample {
        *WORKED_EXAMPLES
            .iter()
            .find(|e| e.input == input)
            .unwrap_or_else(|| panic!("no worked example for {input}"))
    }

    #[test]
    fn test_render_interpolates_text_once() {
        let prompt = NormalizationContract::Detailed.render("MON-FRI: 0800-1800");
        assert!(prompt.ends_with("format:\nMON-FRI: 0800-1800\n"));
        assert!(!prompt.contains(SCHEDULE_PLACEHOLDER));

        let minimal = NormalizationContract::Minimal.render("H24");
        assert_eq!(
            minimal,
            MINIMAL_TEMPLATE.replace(SCHEDULE_PLACEHOLDER, "H24")
        );
    }

    #[test]
    fn test_render_keeps_caller_text_verbatim() {
        let text = "MON-FRI {schedule_text} <b>&";
        let prompt = NormalizationContract::Minimal.render(text);
        assert!(prompt.ends_with("format: MON-FRI {schedule_text} <b>&\n"));
    }

    #[test]
    fn test_versions_are_distinct() {
        assert_ne!(
            NormalizationContract::Detailed.version(),
            NormalizationContract::Minimal.version()
        );
    }

    #[test]
    fn test_detailed_template_embeds_all_examples() {
        let template = NormalizationContract::Detailed.template();
        for ex in NormalizationContract::Detailed.worked_examples() {
            assert!(template.contains(ex.output), "missing example: {}", ex.title);
        }
        assert!(NormalizationContract::Minimal.worked_examples().is_empty());
        assert!(!NormalizationContract::Minimal.template().contains("## EXAMPLES"));
    }

    #[test]
    fn test_examples_are_already_clean() {
        for ex in WORKED_EXAMPLES {
            assert_eq!(cleanup(ex.output), ex.output, "example changed: {}", ex.title);
            let report = inspect_fragment(ex.output);
            assert!(report.is_conformant(), "example not conformant: {}", ex.title);
        }
    }

    #[test]
    fn test_examples_use_two_space_indentation() {
        for ex in WORKED_EXAMPLES {
            let mut depth: usize = 0;
            for line in ex.output.lines() {
                let trimmed = line.trim_start();
                if trimmed.starts_with("</") {
                    depth -= 1;
                }
                assert_eq!(line.len() - trimmed.len(), depth * 2, "bad indent: {line}");
                let opens_block = trimmed.starts_with('<')
                    && !trimmed.starts_with("</")
                    && !trimmed.contains("</");
                if opens_block {
                    depth += 1;
                }
            }
            assert_eq!(depth, 0);
        }
    }

    #[test]
    fn test_day_range_expands_per_day_and_time_range() {
        let ex = example("MON-THU: 0700-1300, 1400-1800");
        assert_eq!(inspect_fragment(ex.output).intervals, 8);
        for day in ["MON", "TUE", "WED", "THU"] {
            let tag = format!("<aixm:day>{day}</aixm:day>");
            assert_eq!(ex.output.matches(&tag).count(), 2, "{day}");
        }
        assert!(!ex.output.contains("dayTil"));
        assert!(!ex.output.contains("MON-THU"));
    }

    #[test]
    fn test_seasons_map_to_default_ranges() {
        let ex = example("SUM: 0600-2145 / WIN: 0700-2100");
        assert_eq!(inspect_fragment(ex.output).intervals, 2);
        let summer = ex.output.find("<aixm:startDate>01-04</aixm:startDate>").unwrap();
        let summer_end = ex.output.find("<aixm:endDate>31-10</aixm:endDate>").unwrap();
        let winter = ex.output.find("<aixm:startDate>01-11</aixm:startDate>").unwrap();
        let winter_end = ex.output.find("<aixm:endDate>31-03</aixm:endDate>").unwrap();
        assert!(summer < summer_end && summer_end < winter && winter < winter_end);
    }

    #[test]
    fn test_annotation_only_input() {
        let ex = example("ATS SKED");
        assert_eq!(inspect_fragment(ex.output).intervals, 1);
        assert!(ex.output.contains("<aixm:day>ANY</aixm:day>"));
        assert!(ex.output.contains("<aixm:startDate>01-01</aixm:startDate>"));
        assert!(ex.output.contains("<aixm:endDate>31-12</aixm:endDate>"));
        assert!(!ex.output.contains("startTime"));
        assert!(!ex.output.contains("endTime"));
        assert!(ex.output.contains("<aixm:Note>ATS SKED</aixm:Note>"));
    }

    #[test]
    fn test_holiday_exclusion_has_no_times() {
        let ex = example("Daily: 0900-1700 except holidays");
        let excluded = ex.output.split("<aixm:timeInterval>").last().unwrap();
        assert!(excluded.contains("<aixm:day>HOL</aixm:day>"));
        assert!(excluded.contains("<aixm:excluded>YES</aixm:excluded>"));
        assert!(!excluded.contains("startTime"));
    }
}

//! The label table: which literal runs mark a value region, and what is
//! written into the slots that follow them.

use chrono::NaiveDate;

use super::settings::SlotLayout;
use super::stats::StatsRecord;
use crate::app::error::{AppError, Result};
use crate::app::services::text_ops::group_thousands;
use crate::app::services::uptime::calculate_uptime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Repos,
    Contributed,
    Commits,
    Stars,
    Followers,
    LinesOfCode,
    Uptime,
}

impl Label {
    /// The exact run text that marks this label in a document.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Repos => "Repos",
            Self::Contributed => "Contributed",
            Self::Commits => "Commits",
            Self::Stars => "Stars",
            Self::Followers => "Followers",
            Self::LinesOfCode => "Lines of Code",
            Self::Uptime => "Uptime",
        }
    }
}

/// Rendering inputs that are not part of the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: SlotLayout,
    pub uptime_since: Option<NaiveDate>,
    pub today: NaiveDate,
}

impl RenderOptions {
    pub fn new(layout: SlotLayout, uptime_since: Option<NaiveDate>) -> Self {
        Self {
            layout,
            uptime_since,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Reject a reference date that lies after `today`.
    pub fn validate(&self) -> Result<()> {
        match self.uptime_since {
            Some(since) if since > self.today => Err(AppError::Configuration(format!(
                "uptime reference date {} is after today ({})",
                since, self.today
            ))),
            _ => Ok(()),
        }
    }
}

type Render = fn(&StatsRecord, &RenderOptions) -> Vec<String>;

/// One row of the table. `render` yields one string per value slot; the
/// first slot sits `offset` runs after the label and the rest follow it.
#[derive(Debug, Clone)]
pub struct LabelRule {
    pub label: Label,
    pub offset: usize,
    pub render: Render,
    /// A label searched for in the remaining runs of the same node once this
    /// rule fires. Its value sits right after it.
    pub nested: Option<Box<LabelRule>>,
}

impl LabelRule {
    fn new(label: Label, offset: usize, render: Render) -> Self {
        Self {
            label,
            offset,
            render,
            nested: None,
        }
    }

    fn with_nested(mut self, nested: LabelRule) -> Self {
        self.nested = Some(Box::new(nested));
        self
    }

    pub fn values(&self, record: &StatsRecord, options: &RenderOptions) -> Vec<String> {
        (self.render)(record, options)
    }
}

fn render_repos(record: &StatsRecord, _: &RenderOptions) -> Vec<String> {
    vec![record.repository_count.to_string()]
}

fn render_contributed(record: &StatsRecord, options: &RenderOptions) -> Vec<String> {
    let value = if options.layout.pads_contributed() {
        format!("{:02}", record.contributed_repository_count)
    } else {
        record.contributed_repository_count.to_string()
    };
    vec![value]
}

fn render_commits(record: &StatsRecord, _: &RenderOptions) -> Vec<String> {
    vec![group_thousands(record.commit_count)]
}

fn render_stars(record: &StatsRecord, _: &RenderOptions) -> Vec<String> {
    vec![record.star_count.to_string()]
}

fn render_followers(record: &StatsRecord, _: &RenderOptions) -> Vec<String> {
    vec![record.follower_count.to_string()]
}

fn render_lines(record: &StatsRecord, _: &RenderOptions) -> Vec<String> {
    vec![
        group_thousands(record.total_lines()),
        format!("++{}", group_thousands(record.lines_added)),
        format!("--{}", group_thousands(record.lines_deleted)),
    ]
}

fn render_uptime(_: &StatsRecord, options: &RenderOptions) -> Vec<String> {
    options
        .uptime_since
        .and_then(|since| calculate_uptime(since, options.today))
        .map(|uptime| vec![uptime.to_string()])
        .unwrap_or_default()
}

/// Build the table for one document update.
///
/// `Uptime` is only recognised when a reference date is configured and is
/// not in the future. Callers reject a future date with
/// [`RenderOptions::validate`] first.
pub fn label_rules(options: &RenderOptions) -> Vec<LabelRule> {
    let offset = options.layout.value_offset();
    let mut rules = vec![
        LabelRule::new(Label::Repos, offset, render_repos)
            .with_nested(LabelRule::new(Label::Contributed, 1, render_contributed)),
        LabelRule::new(Label::Commits, offset, render_commits),
        LabelRule::new(Label::Stars, offset, render_stars),
        LabelRule::new(Label::Followers, offset, render_followers),
        LabelRule::new(Label::LinesOfCode, offset, render_lines),
    ];

    let uptime_known = options
        .uptime_since
        .is_some_and(|since| since <= options.today);
    if uptime_known {
        rules.push(LabelRule::new(Label::Uptime, offset, render_uptime));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(layout: SlotLayout, uptime_since: Option<NaiveDate>) -> RenderOptions {
        RenderOptions {
            layout,
            uptime_since,
            today: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    fn rule(rules: &[LabelRule], label: Label) -> &LabelRule {
        rules.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Label::Repos.token(), "Repos");
        assert_eq!(Label::LinesOfCode.token(), "Lines of Code");
        assert_eq!(Label::Contributed.token(), "Contributed");
    }

    #[test]
    fn test_lines_render_three_slots() {
        let record = StatsRecord {
            lines_added: 100,
            lines_deleted: 40,
            ..Default::default()
        };
        let opts = options(SlotLayout::Adjacent, None);
        let rules = label_rules(&opts);
        let values = rule(&rules, Label::LinesOfCode).values(&record, &opts);
        assert_eq!(values, vec!["140", "++100", "--40"]);
    }

    #[test]
    fn test_commits_use_thousands_separator() {
        let record = StatsRecord {
            commit_count: 1234567,
            ..Default::default()
        };
        let opts = options(SlotLayout::Adjacent, None);
        let rules = label_rules(&opts);
        assert_eq!(
            rule(&rules, Label::Commits).values(&record, &opts),
            vec!["1,234,567"]
        );
    }

    #[test]
    fn test_contributed_padding_follows_layout() {
        let record = StatsRecord {
            contributed_repository_count: 7,
            ..Default::default()
        };

        let adjacent = options(SlotLayout::Adjacent, None);
        let nested = label_rules(&adjacent)[0].nested.clone().unwrap();
        assert_eq!(nested.label, Label::Contributed);
        assert_eq!(nested.offset, 1);
        assert_eq!(nested.values(&record, &adjacent), vec!["7"]);

        let separated = options(SlotLayout::Separated, None);
        let nested = label_rules(&separated)[0].nested.clone().unwrap();
        assert_eq!(nested.values(&record, &separated), vec!["07"]);
    }

    #[test]
    fn test_offsets_follow_layout() {
        let rules = label_rules(&options(SlotLayout::Separated, None));
        assert!(rules.iter().all(|r| r.offset == 2));
        let rules = label_rules(&options(SlotLayout::Adjacent, None));
        assert!(rules.iter().all(|r| r.offset == 1));
    }

    #[test]
    fn test_uptime_only_with_reference_date() {
        let rules = label_rules(&options(SlotLayout::Adjacent, None));
        assert!(rules.iter().all(|r| r.label != Label::Uptime));

        let since = NaiveDate::from_ymd_opt(2003, 11, 14);
        let opts = options(SlotLayout::Adjacent, since);
        let rules = label_rules(&opts);
        let values = rule(&rules, Label::Uptime).values(&StatsRecord::default(), &opts);
        assert_eq!(values, vec!["20 years, 01 months, 27 days"]);
    }

    #[test]
    fn test_future_uptime_reference_is_rejected() {
        let since = NaiveDate::from_ymd_opt(2030, 1, 1);
        let opts = options(SlotLayout::Adjacent, since);
        let err = opts.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(label_rules(&opts).iter().all(|r| r.label != Label::Uptime));
    }

    #[test]
    fn test_validate_accepts_past_today_and_missing_reference() {
        assert!(options(SlotLayout::Adjacent, None).validate().is_ok());
        let today = NaiveDate::from_ymd_opt(2024, 1, 10);
        assert!(options(SlotLayout::Adjacent, today).validate().is_ok());
        let past = NaiveDate::from_ymd_opt(2003, 11, 14);
        assert!(options(SlotLayout::Separated, past).validate().is_ok());
    }
}

use indicatif::{ProgressBar, ProgressStyle};

const BYTES_TEMPLATE: &str = "{prefix:28!} [{elapsed_precise}] [{bar:30.cyan/blue}] {binary_bytes:>10}/{binary_total_bytes:10} {binary_bytes_per_sec}";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// Draw a byte progress bar on stderr.
    #[default]
    Bar,
    /// Track progress without drawing anything.
    Hidden,
}

impl ProgressMode {
    /// Progress bar counting remote bytes for one download.
    pub fn bytes_bar(self, label: &str, total: u64) -> ProgressBar {
        let bar = match self {
            ProgressMode::Bar => ProgressBar::new(total).with_style(bytes_style()),
            ProgressMode::Hidden => {
                let bar = ProgressBar::hidden();
                bar.set_length(total);
                bar
            }
        };
        bar.set_prefix(label.to_string());
        bar
    }
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(BYTES_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

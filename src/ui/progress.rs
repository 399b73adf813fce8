use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Byte progress indicator for a single operation.
///
/// Cheap to clone; clones drive the same bar, so one can be moved into a
/// blocking task while the caller keeps another.
#[derive(Clone)]
pub struct Bar {
    bar: ProgressBar,
}

impl Bar {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()).progress_chars("●○ ");

        bar.set_style(style);
        bar.set_message(description.to_owned());

        Self { bar }
    }

    #[inline]
    pub fn add(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }

    pub fn abandon(&self) {
        self.bar.abandon_with_message("Failed");
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        if !self.bar.is_finished() && self.bar.length() == Some(self.bar.position()) {
            self.bar.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Bar {
        fn hidden() -> Self {
            Self { bar: ProgressBar::hidden() }
        }
    }

    #[test]
    fn test_clones_share_position() {
        let bar = Bar::hidden();
        let clone = bar.clone();
        clone.add(10);
        bar.add(5);
        assert_eq!(bar.bar.position(), 15);
    }
}

//! Text label.

use lume_core::subject::{ObserverEntry, Subject};
use lume_core::widget;

use crate::mixins::Widget;
use crate::state::State;

super::widget_handle! {
    /// Single piece of styled text.
    Label
}

/// Observer writing a formatted subject value into a label's text. The
/// format string rides in the entry; the label is the bound widget.
fn write_bound_text(subject: &Subject, entry: &ObserverEntry) {
    if let (Some(w), Some(fmt)) = (entry.widget(), entry.fmt()) {
        widget::set_text(w, &fmt.replacen("{}", &subject.int().to_string(), 1));
    }
}

impl Label {
    pub fn create(parent: impl Widget) -> Self {
        Self(crate::Obj::create(parent))
    }

    pub fn text(self, text: &str) -> Self {
        widget::set_text(self.raw(), text);
        self
    }

    pub fn get_text(self) -> String {
        widget::text(self.raw())
    }

    /// Keep the label's text in sync with an integer state.
    ///
    /// `fmt` is a static pattern whose first `{}` is replaced by the value
    /// (`"Count: {}"`). The text updates immediately and on every change;
    /// the observer is torn down when the label is deleted. The state must
    /// outlive the label.
    pub fn bind_text(self, state: &State<i32>, fmt: &'static str) -> Self {
        let subject = state.subject();
        subject.subscribe_with_widget_fmt(write_bound_text, self.raw(), fmt);
        widget::set_text(self.raw(), &fmt.replacen("{}", &subject.int().to_string(), 1));
        self
    }
}

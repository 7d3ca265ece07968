fn main() {
    nih_plug::nih_export_standalone::<feedback_plugin::FeedbackPlugin>();
}

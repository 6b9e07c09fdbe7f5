fn main() -> Result<(), eframe::Error> {
    // Set up logging; RUST_LOG=debug shows refused connections and migrations
    env_logger::init();

    // Run the automation editor
    automation_editor::run_app()
}

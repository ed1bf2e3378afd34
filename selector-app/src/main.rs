fn main() -> eframe::Result {
    selector_app::run_native()
}

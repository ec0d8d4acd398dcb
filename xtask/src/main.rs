/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle rise-up --release
///
/// This compiles the plugin as a cdylib and packages it into
/// `target/bundled/Rise Up.vst3` and `Rise Up.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}

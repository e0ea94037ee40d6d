pub fn main() {
    toolchain_config_lib::frontend::cli::main();
}

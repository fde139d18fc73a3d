fn main() {
    seca_converter::run()
}

fn main() {
  calus::main();
}

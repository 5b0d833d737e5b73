fn main() {
    // ESP-IDF link arguments are only needed for the firmware binary;
    // host builds (tests, fuzzing) compile the library alone.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

fn main() {
    #[cfg(feature = "synapse")]
    link_synapse();
}

#[cfg(feature = "synapse")]
fn link_synapse() {
    println!("cargo:rerun-if-env-changed=HABANA_LIB_DIR");

    // the habana driver packages install libSynapse here
    let lib_dir = std::env::var("HABANA_LIB_DIR").unwrap_or_else(|_| "/usr/lib/habanalabs".into());
    println!("cargo:rustc-link-search=native={lib_dir}");
}

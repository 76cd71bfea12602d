fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = protoc_bin_vendored::protoc_bin_path().map_err(|e| format!("{e:?}"))?;
    let well_known = protoc_bin_vendored::include_path().map_err(|e| format!("{e:?}"))?;

    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc);

    tonic_build::configure().compile_protos_with_config(
        config,
        &["proto/pvz/v1/pvz.proto"],
        &[std::path::PathBuf::from("proto"), well_known],
    )?;
    Ok(())
}

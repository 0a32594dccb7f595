/**
 * Generates rust sources for the metadata records from resources/phonemetadata.proto
 */

fn main() {
    println!("cargo:rerun-if-changed=resources/phonemetadata.proto");

    protobuf_codegen::Codegen::new()
        .pure()
        .includes(["resources"])
        .input("resources/phonemetadata.proto")
        .cargo_out_dir("proto_gen")
        .run_from_script();
}

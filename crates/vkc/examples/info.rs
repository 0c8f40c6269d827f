// Lists the instance layers and extensions of the system, then creates
// an instance, a compute device and, if a path is given, a shader module.
//
//     RUST_LOG=debug cargo run --example info -- [shader.spv]

use ash::vk;
use vkc::{CapabilityMatch, Context, ContextConfig, ExtensionSet, LayerSet};

fn main() {
    env_logger::init();

    let entry = vkc::platform::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    println!("vkc info\n--------");
    match LayerSet::enumerate(&entry) {
        Ok(layers) => {
            println!("{} instance layers:", layers.len());
            for layer in layers.names() {
                println!("  - {}", layer.to_string_lossy());
            }
        }
        Err(e) => println!("No instance layers: {e}"),
    }

    let extensions = ExtensionSet::enumerate(&entry).unwrap();
    println!("\n{} instance extensions:", extensions.len());
    for extension in extensions.names() {
        println!("  - {}", extension.to_string_lossy());
    }

    // The portability extension is only there on some platforms.
    let extension_match = CapabilityMatch::new(
        &extensions,
        &[c"VK_KHR_portability_enumeration", c"VK_EXT_debug_utils"],
    )
    .ok();
    let layer_match = LayerSet::enumerate(&entry)
        .and_then(|layers| CapabilityMatch::new(&layers, &[c"VK_LAYER_KHRONOS_validation"]))
        .ok();

    let config = ContextConfig::builder()
        .application_name("vkc info")
        .max_api_version(vk::API_VERSION_1_3)
        .build()
        .unwrap();
    let context = Context::new(
        &entry,
        &config,
        layer_match.as_ref(),
        extension_match.as_ref(),
        None,
    )
    .unwrap();
    drop(layer_match);
    drop(extension_match);
    println!("\n{context:?}");

    let none: [&std::ffi::CStr; 0] = [];
    let device = vkc::device::ComputeDevice::new(&context, &none, None).unwrap();
    println!("{device:?}");

    if let Some(path) = std::env::args().nth(1) {
        let module = device.create_shader_module(&path).unwrap();
        println!("{module:?}");
    }
}

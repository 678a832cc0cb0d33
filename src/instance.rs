use std::{
    ffi::{CStr, CString},
    ops::Deref,
};

use ash::{
    ext::debug_utils,
    vk::{self, make_api_version, ApplicationInfo, InstanceCreateInfo, API_VERSION_1_3},
    Entry,
};
use tracing::debug;

use crate::{
    error::{RenderError, VkContext},
    logging::debug_messenger_create_info,
    RendererConfig,
};

const API_VERSION: u32 = API_VERSION_1_3;
const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// The connection to the Vulkan loader. Created first and dropped last.
pub struct Instance {
    debug_messenger: Option<DebugMessenger>,
    instance: ash::Instance,
    entry: Entry,
}

struct DebugMessenger {
    debug_utils: debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl Instance {
    /// Creates an Instance to interact with the core of Vulkan. Registers the needed extensions and
    /// layers, as well as basic information about the application.
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let entry = unsafe { Entry::load()? };

        let app_name = CString::new(config.application_name.as_str())?;
        let app_version = make_api_version(
            0,
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        );

        let app_info = ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(app_version)
            .api_version(API_VERSION)
            .engine_name(&app_name)
            .engine_version(app_version);

        let extension_names = required_instance_extensions(config);
        debug!("Instance extensions: {:?}", extension_names);
        let extension_name_ptrs = extension_names
            .iter()
            .map(|name| name.as_ptr())
            .collect::<Vec<_>>();

        let layer_names = required_layers(config);
        debug!("Layers to enable: {:?}", layer_names);
        let layer_name_ptrs = layer_names
            .iter()
            .map(|name| name.as_ptr())
            .collect::<Vec<_>>();

        let mut instance_debug_info = debug_messenger_create_info();
        let mut instance_create_info = InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extension_name_ptrs)
            .enabled_layer_names(&layer_name_ptrs);
        if config.enable_validations {
            instance_create_info = instance_create_info.push_next(&mut instance_debug_info);
        }

        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .vk_context("vkCreateInstance")?;

        let debug_messenger = if config.enable_validations {
            let debug_utils = debug_utils::Instance::new(&entry, &instance);
            let messenger = unsafe {
                debug_utils.create_debug_utils_messenger(&debug_messenger_create_info(), None)
            };
            match messenger {
                Ok(messenger) => Some(DebugMessenger {
                    debug_utils,
                    messenger,
                }),
                Err(result) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(RenderError::Vulkan {
                        operation: "vkCreateDebugUtilsMessengerEXT",
                        result,
                    });
                }
            }
        } else {
            None
        };

        debug!("Instance created");
        Ok(Self {
            debug_messenger,
            instance,
            entry,
        })
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

/// The host's windowing extensions, plus debug utils when validating.
fn required_instance_extensions(config: &RendererConfig) -> Vec<&'static CStr> {
    let mut extension_names = config.instance_extensions.clone();
    if config.enable_validations && !extension_names.contains(&debug_utils::NAME) {
        extension_names.push(debug_utils::NAME);
    }
    extension_names
}

fn required_layers(config: &RendererConfig) -> Vec<&'static CStr> {
    if config.enable_validations {
        vec![VALIDATION_LAYER]
    } else {
        vec![]
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        debug!("Dropping Instance");
        unsafe {
            if let Some(debug_messenger) = self.debug_messenger.take() {
                debug_messenger
                    .debug_utils
                    .destroy_debug_utils_messenger(debug_messenger.messenger, None);
            }
            self.instance.destroy_instance(None)
        }
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

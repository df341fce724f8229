pub mod services;

pub use services::{
    absolute_post_image_url, absolute_profile_image_url, ext_from_mime, post_image_key,
    profile_image_key,
};

pub mod camera;
pub mod fisheye;

mod backend;
mod boot;
mod boot_runtime;
mod host_page;
mod observer;
mod storage;
mod widget;

fn main() {
    boot::run();
}

mod rendezvous_link;

pub use rendezvous_link::RendezvousLink;

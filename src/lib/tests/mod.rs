mod test;
